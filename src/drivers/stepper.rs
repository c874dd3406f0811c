// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! STEP/DIR/nENABLE stepper pulse driver.
//!
//! The external power stage takes one pulse per step on STEP, a level on
//! DIR, and an active-low enable. The driver owns the three pins plus a
//! microsecond delay source for the settle times the stage requires:
//! the DIR line must lead the pulse by at least 5 µs when the direction
//! changes, the pulse itself must stay high for at least 2.5 µs, and the
//! power stage needs 100 µs after an enable or disable.

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::OutputPin;

/// Direction of a single step.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// Interface to the stepper power stage.
///
/// Each `step` call performs any required direction-change settle delay
/// internally and blocks only as long as the hardware requires.
pub trait StepperDriver {
    /// Energize the motor windings.
    fn enable(&mut self);
    /// Cut motor power; the shaft is free to rotate.
    fn disable(&mut self);
    /// Issue exactly one step pulse in `direction`.
    fn step(&mut self, direction: Direction);
}

const ENABLE_SETTLE_US: u32 = 100;
// direction signal must lead the pulse by at least 5 us
const DIRECTION_LEAD_US: u32 = 5;
// pulse must be at least 2.5 us
const STEP_PULSE_US: u32 = 3;

/// Pulse driver over three GPIO lines and a delay source.
pub struct StepDir<Step, Dir, En, D> {
    step_pin: Step,
    dir_pin: Dir,
    n_enable_pin: En,
    delay: D,
    last_direction: Option<Direction>,
}

impl<Step, Dir, En, D> StepDir<Step, Dir, En, D>
where
    Step: OutputPin,
    Dir: OutputPin,
    En: OutputPin,
    D: DelayUs<u32>,
{
    pub fn new(step_pin: Step, dir_pin: Dir, n_enable_pin: En, delay: D) -> Self {
        Self {
            step_pin,
            dir_pin,
            n_enable_pin,
            delay,
            last_direction: None,
        }
    }

    /// Release the pins.
    pub fn free(self) -> (Step, Dir, En) {
        (self.step_pin, self.dir_pin, self.n_enable_pin)
    }
}

impl<Step, Dir, En, D> StepperDriver for StepDir<Step, Dir, En, D>
where
    Step: OutputPin,
    Dir: OutputPin,
    En: OutputPin,
    D: DelayUs<u32>,
{
    fn enable(&mut self) {
        self.n_enable_pin.set_low().ok();
        self.delay.delay_us(ENABLE_SETTLE_US);
    }

    fn disable(&mut self) {
        self.n_enable_pin.set_high().ok();
        self.delay.delay_us(ENABLE_SETTLE_US);
    }

    fn step(&mut self, direction: Direction) {
        if self.last_direction != Some(direction) {
            match direction {
                Direction::Forward => self.dir_pin.set_high().ok(),
                Direction::Reverse => self.dir_pin.set_low().ok(),
            };
            self.delay.delay_us(DIRECTION_LEAD_US);
            self.last_direction = Some(direction);
        }
        self.step_pin.set_high().ok();
        self.delay.delay_us(STEP_PULSE_US);
        self.step_pin.set_low().ok();
    }
}
