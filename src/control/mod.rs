// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Motion Control
//!
//! This module provides the motion-planning and control-loop logic for the stage axis.
//!
//! ## Modules
//!
//! - [`planner`] - Acceleration-limited trapezoidal motion planner.
//! - [`step_controller`] - Fixed-period control loop issuing steps toward the planned target.

pub mod planner;
pub mod step_controller;

pub use planner::{MotionPlanner, TargetMode};
pub use step_controller::StepController;
