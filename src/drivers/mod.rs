// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Device-Specific Drivers
//!
//! This module contains device-specific drivers that sit above the raw `hw/` layer and below the
//! application logic.
//!
//! ## Existing drivers
//!
//! - [`stepper`] – STEP/DIR/nENABLE stepper power-stage pulse driver

pub mod stepper;

pub use stepper::{Direction, StepDir, StepperDriver};
