// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Fixed-period stepping control loop.
//!
//! [`StepController`] wires the double-send filter, the motion planner, and
//! the stepper driver together. Call [`tick`](StepController::tick) once
//! per control period:
//!
//! ```ignore
//! loop {
//!     uptime.block_until(next_tick);
//!     controller.tick(&mut parser, uptime.now());
//!     next_tick += CONTROL_PERIOD_US;
//! }
//! ```
//!
//! Each tick polls for a verified command, applies motor power on enable
//! edges (never re-asserted every tick), and issues at most one step toward
//! the planner's instantaneous target. That caps the step rate at one step
//! per period; a velocity limit or gearing that asks for more will simply
//! fall behind, with the tracking error growing unbounded and unreported.

use crate::control::planner::MotionPlanner;
use crate::drivers::stepper::{Direction, StepperDriver};
use crate::protocol::dedup::Dedup;
use crate::protocol::parser::Parser;

pub struct StepController<D: StepperDriver> {
    driver: D,
    planner: MotionPlanner,
    dedup: Dedup,
    /// Steps issued so far, signed, relative to the boot position.
    actual_steps: i32,
    motor_powered: bool,
}

impl<D: StepperDriver> StepController<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            planner: MotionPlanner::new(),
            dedup: Dedup::new(),
            actual_steps: 0,
            motor_powered: false,
        }
    }

    /// Run one control tick at absolute uptime `now_us`.
    pub fn tick(&mut self, parser: &mut Parser, now_us: u64) {
        if let Some(command) = self.dedup.poll(parser) {
            self.planner.apply(&command, now_us);
        }

        let enabled = self.planner.is_enabled();
        if enabled != self.motor_powered {
            if enabled {
                self.driver.enable();
            } else {
                self.driver.disable();
            }
            self.motor_powered = enabled;
        }

        let target = self.planner.target_steps(now_us);
        if target > self.actual_steps {
            self.driver.step(Direction::Forward);
            self.actual_steps += 1;
        } else if target < self.actual_steps {
            self.driver.step(Direction::Reverse);
            self.actual_steps -= 1;
        }
    }

    /// Steps actually issued so far (signed, relative to boot).
    pub fn position_steps(&self) -> i32 {
        self.actual_steps
    }

    /// Access the wrapped driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }
}
