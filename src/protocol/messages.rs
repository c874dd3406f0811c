// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Command messages for the serial motion protocol.
//!
//! Commands are two lowercase letters, an `=`, and a signed decimal value,
//! terminated by CR or LF: `tp=-123.4567890`. Each command must be sent
//! twice, identically, before it takes effect (see
//! [`dedup`](crate::protocol::dedup)).

// Recognized command codes
/// Enable (nonzero) or disable (zero) motor power.
pub const CMD_ENABLE: [u8; 2] = *b"en";
/// Set the velocity limit (deg/sec).
pub const CMD_MAX_VELOCITY: [u8; 2] = *b"mv";
/// Set the acceleration limit (deg/sec²).
pub const CMD_MAX_ACCELERATION: [u8; 2] = *b"ma";
/// Set the steps-per-revolution gearing factor.
pub const CMD_STEPS_PER_REV: [u8; 2] = *b"sr";
/// Command a target position (deg).
pub const CMD_TARGET_POSITION: [u8; 2] = *b"tp";
/// Command a target velocity (deg/sec).
pub const CMD_TARGET_VELOCITY: [u8; 2] = *b"tv";

/// One decoded protocol command.
///
/// Codes outside the recognized set parse and verify like any other but are
/// ignored by the planner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Command {
    /// Two-letter command code, `a`–`z` each.
    pub code: [u8; 2],
    /// Numeric argument; `0.0` when the line carried none.
    pub value: f64,
}
