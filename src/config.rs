// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Compiled-in defaults and timing constants.
//!
//! Motion limits and the gearing factor are runtime-configurable over the
//! serial protocol but live only in RAM; every restart begins from the
//! values here.

/// Default velocity limit (deg/sec).
pub const DEFAULT_MAX_VELOCITY: f64 = 90.0;

/// Default acceleration limit (deg/sec²).
pub const DEFAULT_MAX_ACCELERATION: f64 = 10.0;

/// Default steps-per-revolution of the final output shaft: the product of
/// the motor's full steps per revolution, the driver's microstepping
/// setting, and any gearing between motor and stage.
pub const DEFAULT_STEPS_PER_REV: i32 = 25_000;

/// Control loop period (µs). Also the ceiling on the step rate: the loop
/// emits at most one step per period, so the configured velocity limit and
/// steps-per-revolution must stay below `1e6 / CONTROL_PERIOD_US` steps/sec.
pub const CONTROL_PERIOD_US: u64 = 100;

/// Uptime tick period (µs). The tick timer interrupts at this interval and
/// its counter register provides the sub-tick microseconds.
pub const TICK_PERIOD_US: u64 = 1_000;

/// Capacity of the ISR-to-loop serial byte queue. At 115 200 baud roughly
/// 12 bytes arrive per millisecond, so this covers several control periods
/// of slack.
pub const RX_QUEUE_DEPTH: usize = 64;
