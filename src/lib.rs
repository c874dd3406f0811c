// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Rotostage Firmware
//!
//! Firmware for a single-axis stepper-driven rotary stage, targeting an
//! STM32F777 MCU. Short ASCII commands arrive over a serial link and drive
//! the stepper through acceleration-limited motion profiles in either a
//! target-position or a target-velocity mode, under a fixed-period
//! real-time control loop.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`protocol`] | Serial command protocol: byte-level parser and double-send filter |
//! | [`control`] | Motion planning and the fixed-period stepping control loop |
//! | [`drivers`] | Device-level drivers (STEP/DIR/nENABLE pulse driver) |
//! | [`time`] | Monotonic microsecond uptime clock |
//! | [`hw`] | MCU-level glue: pins, USART, tick timer, LED, watchdog (feature `firmware`) |
//!
//! ## Getting Started
//!
//! Run the host test suite:
//!
//! ```bash
//! cargo test
//! ```
//!
//! Flash the board:
//!
//! ```bash
//! cargo run --release --features firmware
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod control;
pub mod drivers;
#[cfg(feature = "firmware")]
pub mod hw;
pub mod protocol;
pub mod time;
