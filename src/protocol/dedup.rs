// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Double-send command filter.
//!
//! The wire format carries no checksum. Instead, every command must be
//! transmitted twice, consecutively and identically, before it is surfaced.
//! Any mismatch between the two repeats drops the command with no retry and
//! no notification; the burden of resending is entirely on the sender.

use crate::protocol::messages::Command;
use crate::protocol::parser::Parser;

pub struct Dedup {
    previous: Option<Command>,
    current: Option<Command>,
}

impl Dedup {
    pub fn new() -> Self {
        Self {
            previous: None,
            current: None,
        }
    }

    /// Poll the parser for a freshly completed line. Shifts the remembered
    /// pair and surfaces a command only when the last two transmissions
    /// were exactly equal — both letters and the parsed value.
    pub fn poll(&mut self, parser: &mut Parser) -> Option<Command> {
        let fresh = parser.take()?;
        self.previous = core::mem::replace(&mut self.current, Some(fresh));
        if self.previous == self.current {
            self.current
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(parser: &mut Parser, line: &str) {
        for &byte in line.as_bytes() {
            parser.consume_byte(byte);
        }
    }

    #[test]
    fn identical_pair_surfaces_exactly_one_command() {
        let mut parser = Parser::new();
        let mut dedup = Dedup::new();

        feed(&mut parser, "tp=180\n");
        assert!(dedup.poll(&mut parser).is_none());

        feed(&mut parser, "tp=180\n");
        let command = dedup.poll(&mut parser).unwrap();
        assert_eq!(command.code, *b"tp");
        assert_eq!(command.value, 180.0);

        // nothing new on the wire, nothing surfaced
        assert!(dedup.poll(&mut parser).is_none());
    }

    #[test]
    fn differing_pair_surfaces_nothing() {
        let mut parser = Parser::new();
        let mut dedup = Dedup::new();

        feed(&mut parser, "tp=180\n");
        assert!(dedup.poll(&mut parser).is_none());
        feed(&mut parser, "tp=181\n");
        assert!(dedup.poll(&mut parser).is_none());
    }

    #[test]
    fn code_mismatch_rejects_even_with_equal_values() {
        let mut parser = Parser::new();
        let mut dedup = Dedup::new();

        feed(&mut parser, "tp=5\n");
        assert!(dedup.poll(&mut parser).is_none());
        feed(&mut parser, "tv=5\n");
        assert!(dedup.poll(&mut parser).is_none());
    }

    #[test]
    fn retransmission_after_a_mismatch_recovers() {
        let mut parser = Parser::new();
        let mut dedup = Dedup::new();

        feed(&mut parser, "mv=90\n");
        assert!(dedup.poll(&mut parser).is_none());
        feed(&mut parser, "mv=91\n");
        assert!(dedup.poll(&mut parser).is_none());

        // the sender resends both copies
        feed(&mut parser, "mv=91\n");
        let command = dedup.poll(&mut parser).unwrap();
        assert_eq!(command.value, 91.0);
    }

    #[test]
    fn every_consecutive_identical_pair_fires() {
        let mut parser = Parser::new();
        let mut dedup = Dedup::new();

        feed(&mut parser, "en=1\n");
        assert!(dedup.poll(&mut parser).is_none());
        feed(&mut parser, "en=1\n");
        assert!(dedup.poll(&mut parser).is_some());
        // a third identical copy pairs with the second
        feed(&mut parser, "en=1\n");
        assert!(dedup.poll(&mut parser).is_some());
    }
}
