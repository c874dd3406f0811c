// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Byte-at-a-time parser for the serial motion protocol.
//!
//! The parser is a five-state machine fed one byte per call. A completed
//! line publishes a [`Command`] into a single-slot ready buffer with a
//! one-shot flag; [`Parser::take`] claims it. Anything unexpected resets
//! the machine silently — there is no error reporting back to the sender.
//!
//! The parser must be fed from a single producer context (one interrupt
//! handler or one polling loop); concurrent calls are not supported.

use heapless::Vec;

use crate::protocol::messages::Command;

/// Cap on the accumulated numeric literal. Further digits are dropped, not
/// treated as an error.
const VALUE_CAP: usize = 31;

enum State {
    Reset,
    ExpectLetter1,
    ExpectLetter2,
    ExpectEquals,
    ExpectValueOrEnd,
}

pub struct Parser {
    state: State,
    code: [u8; 2],
    value: Vec<u8, VALUE_CAP>,
    ready: Option<Command>,
}

impl Parser {
    pub fn new() -> Self {
        Self {
            state: State::Reset,
            code: [0; 2],
            value: Vec::new(),
            ready: None,
        }
    }

    /// Advance the state machine by exactly one byte.
    ///
    /// A byte that does not fit the current state resets the machine and is
    /// then re-evaluated once as the potential first letter of a new
    /// command, so recovery does not cost an extra byte.
    pub fn consume_byte(&mut self, byte: u8) {
        if !self.advance(byte) {
            self.state = State::Reset;
            let _ = self.advance(byte);
        }
    }

    /// Claim the most recently completed command, clearing the ready flag.
    /// Returns `None` until the next complete line.
    pub fn take(&mut self) -> Option<Command> {
        self.ready.take()
    }

    /// Returns `false` when `byte` does not fit the current state.
    fn advance(&mut self, byte: u8) -> bool {
        if let State::Reset = self.state {
            self.code = [0; 2];
            self.value.clear();
            self.state = State::ExpectLetter1;
        }

        match self.state {
            State::Reset | State::ExpectLetter1 => {
                if byte.is_ascii_lowercase() {
                    self.code[0] = byte;
                    self.state = State::ExpectLetter2;
                    true
                } else {
                    false
                }
            }

            State::ExpectLetter2 => {
                if byte.is_ascii_lowercase() {
                    self.code[1] = byte;
                    self.state = State::ExpectEquals;
                    true
                } else {
                    false
                }
            }

            State::ExpectEquals => {
                if byte == b'=' {
                    self.state = State::ExpectValueOrEnd;
                    true
                } else {
                    false
                }
            }

            State::ExpectValueOrEnd => match byte {
                b'-' | b'.' | b'0'..=b'9' => {
                    // silently dropped once the buffer is full
                    let _ = self.value.push(byte);
                    true
                }
                b'\r' | b'\n' => {
                    self.ready = Some(Command {
                        code: self.code,
                        value: parse_value(&self.value),
                    });
                    self.state = State::Reset;
                    true
                }
                _ => false,
            },
        }
    }
}

/// Best-effort decimal parse with `strtod` semantics: the longest leading
/// prefix that forms a valid number wins, and no valid prefix yields 0.0.
/// The state machine only admits `-`, `.`, and digits, so trimming from the
/// end is equivalent to a left-to-right scan.
fn parse_value(buf: &[u8]) -> f64 {
    let text = core::str::from_utf8(buf).unwrap_or("");
    for end in (1..=text.len()).rev() {
        if let Ok(value) = text[..end].parse::<f64>() {
            return value;
        }
    }
    0.0
}
