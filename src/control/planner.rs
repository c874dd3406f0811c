// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Acceleration-limited motion planning for the stage axis.
//!
//! The planner holds the active target (a position or a velocity), the
//! segment boundary captured when that target was commanded, and the
//! configured limits. [`MotionPlanner::target_steps`] evaluates the
//! trajectory at an absolute uptime and converts the resulting position to
//! whole steps. It is a pure function of the time and the planner state —
//! nothing is integrated incrementally — so a new command simply redefines
//! the boundary conditions and evaluation continues from there.
//!
//! Position moves follow a trapezoidal velocity profile (accelerate,
//! cruise, decelerate), degenerating to a triangular profile when the move
//! is too short to reach the velocity limit. Velocity moves ramp at the
//! acceleration limit and then hold. The position-mode math assumes the
//! segment starts and ends at rest; a `tp` command received while moving
//! therefore latches `stop_needed`, which keeps evaluation in the velocity
//! branch (target zero) until the axis has decelerated to a standstill,
//! and only then re-anchors the segment and lets position math run.

use libm::{fabs, sqrt};

use crate::config::{DEFAULT_MAX_ACCELERATION, DEFAULT_MAX_VELOCITY, DEFAULT_STEPS_PER_REV};
use crate::protocol::messages::{self, Command};

/// Which kind of target the planner is tracking.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TargetMode {
    Position,
    Velocity,
}

fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else {
        -1.0
    }
}

pub struct MotionPlanner {
    mode: TargetMode,
    /// A pending decel-to-stop must finish before position math may run.
    stop_needed: bool,
    enabled: bool,

    max_velocity: f64,
    max_acceleration: f64,
    steps_per_rev: i32,

    /// Commanded final position (deg), position mode only.
    target_position: f64,
    /// Commanded velocity (deg/sec), velocity mode only.
    target_velocity: f64,

    /// Boundary conditions of the active segment: the uptime, position, and
    /// velocity at the moment the current target was commanded.
    segment_start_us: u64,
    segment_start_position: f64,
    segment_start_velocity: f64,

    /// Trajectory evaluated at the most recent `target_steps` call.
    evaluated_position: f64,
    evaluated_velocity: f64,
}

impl MotionPlanner {
    pub fn new() -> Self {
        Self {
            mode: TargetMode::Position,
            stop_needed: false,
            enabled: true,
            max_velocity: DEFAULT_MAX_VELOCITY,
            max_acceleration: DEFAULT_MAX_ACCELERATION,
            steps_per_rev: DEFAULT_STEPS_PER_REV,
            target_position: 0.0,
            target_velocity: 0.0,
            segment_start_us: 0,
            segment_start_position: 0.0,
            segment_start_velocity: 0.0,
            evaluated_position: 0.0,
            evaluated_velocity: 0.0,
        }
    }

    /// Apply one verified command. Unknown codes are ignored; no command
    /// produces an error.
    pub fn apply(&mut self, command: &Command, now_us: u64) {
        match command.code {
            messages::CMD_ENABLE => self.enabled = command.value != 0.0,

            messages::CMD_MAX_VELOCITY => self.max_velocity = command.value,

            messages::CMD_MAX_ACCELERATION => {
                // a non-positive limit would divide the ramp-time
                // computation by zero; such commands are dropped
                if command.value > 0.0 {
                    self.max_acceleration = command.value;
                }
            }

            messages::CMD_STEPS_PER_REV => self.steps_per_rev = command.value as i32,

            messages::CMD_TARGET_POSITION => {
                self.target_position = command.value;
                self.target_velocity = 0.0;
                self.mode = TargetMode::Position;
                self.snapshot_boundary(now_us);
                self.stop_needed = true;
            }

            messages::CMD_TARGET_VELOCITY => {
                self.target_velocity = command.value;
                self.target_position = 0.0;
                self.mode = TargetMode::Velocity;
                self.snapshot_boundary(now_us);
                self.stop_needed = false;
            }

            _ => {}
        }
    }

    /// Whether motor power is commanded on. Unchanged by evaluation.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Evaluate the target trajectory at `now_us` and return the target
    /// step count. The caller issues steps toward this value.
    pub fn target_steps(&mut self, now_us: u64) -> i32 {
        // position math requires the segment to start at rest; while a stop
        // is pending, evaluation stays on the velocity branch
        if self.mode == TargetMode::Position && !self.stop_needed {
            self.evaluate_position(now_us);
        } else {
            self.evaluate_velocity(now_us);
        }
        (self.evaluated_position / 360.0 * self.steps_per_rev as f64) as i32
    }

    fn snapshot_boundary(&mut self, now_us: u64) {
        self.segment_start_us = now_us;
        self.segment_start_position = self.evaluated_position;
        self.segment_start_velocity = self.evaluated_velocity;
    }

    fn evaluate_velocity(&mut self, now_us: u64) {
        let v_target = if self.stop_needed {
            // decelerating toward a stop first; once the evaluated velocity
            // reaches zero, re-anchor the segment at rest so position math
            // can take over on the next evaluation
            if self.evaluated_velocity == 0.0 {
                self.stop_needed = false;
                self.segment_start_us = now_us;
                self.segment_start_position = self.evaluated_position;
                self.segment_start_velocity = 0.0;
            }
            0.0
        } else {
            self.target_velocity
        };

        let p0 = self.segment_start_position;
        let v0 = self.segment_start_velocity;
        let accel = sign(v_target - v0) * self.max_acceleration;
        let ramp_us = (fabs(v_target - v0) * 1e6 / self.max_acceleration) as u64;

        if now_us > self.segment_start_us + ramp_us {
            // holding at the target velocity
            let ramp_s = ramp_us as f64 * 1e-6;
            let cruise_s = (now_us - ramp_us - self.segment_start_us) as f64 * 1e-6;
            self.evaluated_velocity = v_target;
            self.evaluated_position =
                p0 + v0 * ramp_s + 0.5 * accel * ramp_s * ramp_s + v_target * cruise_s;
        } else {
            // still ramping toward the target velocity
            let t = (now_us - self.segment_start_us) as f64 * 1e-6;
            self.evaluated_velocity = v0 + accel * t;
            self.evaluated_position = p0 + v0 * t + 0.5 * accel * t * t;
        }
    }

    fn evaluate_position(&mut self, now_us: u64) {
        // boundary velocity is zero here; stop_needed guarantees it
        let p0 = self.segment_start_position;
        let travel = self.target_position - p0;
        let dir = sign(travel);
        let accel = dir * self.max_acceleration;
        let cruise_v = dir * self.max_velocity;

        let mut ramp_s = self.max_velocity / self.max_acceleration;
        let mut ramp_dist = 0.5 * accel * ramp_s * ramp_s;
        let mut cruise_dist = travel - 2.0 * ramp_dist;

        // a short move never reaches the velocity limit: no cruise phase,
        // accelerate to the midpoint and mirror back down
        if fabs(ramp_dist) > 0.5 * fabs(travel) {
            ramp_dist = 0.5 * travel;
            cruise_dist = 0.0;
            ramp_s = sqrt(2.0 * ramp_dist / accel);
        }

        let cruise_s = fabs(cruise_dist) / self.max_velocity;

        let t1 = self.segment_start_us + (ramp_s * 1e6) as u64;
        let t2 = t1 + (cruise_s * 1e6) as u64;
        let t3 = t2 + (ramp_s * 1e6) as u64;

        let peak_v = accel * ramp_s;

        if now_us > t3 {
            // settled at the target
            self.evaluated_velocity = 0.0;
            self.evaluated_position = self.target_position;
        } else if now_us > t2 {
            // decelerating
            let t = (now_us - t2) as f64 * 1e-6;
            self.evaluated_velocity = peak_v - accel * t;
            self.evaluated_position =
                p0 + ramp_dist + cruise_dist + peak_v * t - 0.5 * accel * t * t;
        } else if now_us > t1 {
            // cruising at the velocity limit
            let t = (now_us - t1) as f64 * 1e-6;
            self.evaluated_velocity = cruise_v;
            self.evaluated_position = p0 + ramp_dist + cruise_v * t;
        } else {
            // accelerating away from the boundary
            let t = (now_us - self.segment_start_us) as f64 * 1e-6;
            self.evaluated_velocity = accel * t;
            self.evaluated_position = p0 + 0.5 * accel * t * t;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    const SEC: u64 = 1_000_000;

    fn command(code: [u8; 2], value: f64) -> Command {
        Command { code, value }
    }

    /// Drive a fresh planner to a position target from rest. Runs the one
    /// evaluation that retires the (already satisfied) stop latch.
    fn planner_with_position_target(target: f64) -> MotionPlanner {
        let mut planner = MotionPlanner::new();
        planner.apply(&command(*b"tp", target), 0);
        assert_eq!(planner.target_steps(0), 0);
        planner
    }

    #[test]
    fn defaults_match_compiled_in_values() {
        let planner = MotionPlanner::new();
        assert!(planner.is_enabled());
        assert_eq!(planner.max_velocity, 90.0);
        assert_eq!(planner.max_acceleration, 10.0);
        assert_eq!(planner.steps_per_rev, 25_000);
    }

    #[test]
    fn short_move_takes_the_triangular_profile() {
        // 90 deg/s, 10 deg/s²: the nominal ramp covers 405°, far more than
        // half of a 180° move, so there is no cruise phase and each ramp
        // lasts sqrt(18) s
        let mut planner = planner_with_position_target(180.0);

        let ramp_s = 18.0_f64.sqrt();

        // mid-acceleration: p = ½·10·t²
        planner.target_steps(2 * SEC);
        assert_approx_eq!(f64, planner.evaluated_position, 20.0, epsilon = 1e-6);
        assert_approx_eq!(f64, planner.evaluated_velocity, 20.0, epsilon = 1e-6);

        // just before the midpoint the velocity peaks near 10·sqrt(18)
        planner.target_steps((ramp_s * 1e6) as u64);
        assert_approx_eq!(f64, planner.evaluated_velocity, 10.0 * ramp_s, epsilon = 1e-3);
        assert_approx_eq!(f64, planner.evaluated_position, 90.0, epsilon = 1e-3);

        // past 2·sqrt(18) ≈ 8.485 s the move settles exactly on target
        let steps = planner.target_steps(8_500_000);
        assert_eq!(planner.evaluated_position, 180.0);
        assert_eq!(planner.evaluated_velocity, 0.0);
        assert_eq!(steps, 12_500); // 180/360 · 25000
    }

    #[test]
    fn long_move_cruises_at_the_velocity_limit() {
        // 1000°: ramps cover 405° each, cruise covers the remaining 190°
        // in 190/90 s after the 9 s ramp
        let mut planner = planner_with_position_target(1_000.0);

        // one second into the cruise phase
        let steps = planner.target_steps(10 * SEC);
        assert_approx_eq!(f64, planner.evaluated_velocity, 90.0, epsilon = 1e-9);
        assert_approx_eq!(f64, planner.evaluated_position, 495.0, epsilon = 1e-3);
        assert_eq!(steps, 34_375); // 495/360 · 25000

        // deceleration mirrors the ramp
        planner.target_steps(12 * SEC);
        assert!(planner.evaluated_velocity < 90.0);
        assert!(planner.evaluated_velocity > 0.0);

        // 9 + 190/90 + 9 ≈ 20.1 s total
        planner.target_steps(21 * SEC);
        assert_eq!(planner.evaluated_position, 1_000.0);
        assert_eq!(planner.evaluated_velocity, 0.0);
    }

    #[test]
    fn reverse_move_settles_on_a_negative_target() {
        let mut planner = planner_with_position_target(-180.0);
        let steps = planner.target_steps(9 * SEC);
        assert_eq!(planner.evaluated_position, -180.0);
        assert_eq!(steps, -12_500);
    }

    #[test]
    fn velocity_mode_ramps_then_cruises() {
        let mut planner = MotionPlanner::new();
        planner.apply(&command(*b"tv", 50.0), 0);

        // ramp: v = 10·t until 5 s
        planner.target_steps(2 * SEC);
        assert_approx_eq!(f64, planner.evaluated_velocity, 20.0, epsilon = 1e-9);
        assert_approx_eq!(f64, planner.evaluated_position, 20.0, epsilon = 1e-9);

        // cruise: v holds at 50, position grows linearly
        let steps = planner.target_steps(10 * SEC);
        assert_eq!(planner.evaluated_velocity, 50.0);
        assert_approx_eq!(f64, planner.evaluated_position, 375.0, epsilon = 1e-6);
        assert_eq!(steps, 26_041); // 375/360 · 25000, truncated

        planner.target_steps(11 * SEC);
        assert_approx_eq!(f64, planner.evaluated_position, 425.0, epsilon = 1e-6);
    }

    #[test]
    fn negative_velocity_target_ramps_down() {
        let mut planner = MotionPlanner::new();
        planner.apply(&command(*b"tv", -50.0), 0);

        planner.target_steps(2 * SEC);
        assert_approx_eq!(f64, planner.evaluated_velocity, -20.0, epsilon = 1e-9);

        planner.target_steps(10 * SEC);
        assert_eq!(planner.evaluated_velocity, -50.0);
        assert_approx_eq!(f64, planner.evaluated_position, -375.0, epsilon = 1e-6);
    }

    #[test]
    fn velocity_retarget_is_continuous() {
        let mut planner = MotionPlanner::new();
        planner.apply(&command(*b"tv", 50.0), 0);
        planner.target_steps(3 * SEC);
        let position_before = planner.evaluated_position;
        let velocity_before = planner.evaluated_velocity;

        // retarget mid-ramp; the new segment starts exactly where the old
        // trajectory was
        planner.apply(&command(*b"tv", 10.0), 3 * SEC);
        planner.target_steps(3 * SEC);
        assert_eq!(planner.evaluated_position, position_before);
        assert_eq!(planner.evaluated_velocity, velocity_before);

        // and decelerates from there toward the new target
        planner.target_steps(4 * SEC);
        assert_approx_eq!(f64, planner.evaluated_velocity, 20.0, epsilon = 1e-9);
        planner.target_steps(10 * SEC);
        assert_eq!(planner.evaluated_velocity, 10.0);
    }

    #[test]
    fn position_command_while_moving_stops_first() {
        let mut planner = MotionPlanner::new();
        planner.apply(&command(*b"tv", 50.0), 0);
        // cruise for a second: at 6 s the axis is at 175°, moving 50 deg/s
        planner.target_steps(6 * SEC);
        assert_eq!(planner.evaluated_velocity, 50.0);

        planner.apply(&command(*b"tp", 0.0), 6 * SEC);

        // still decelerating, not yet tracking the position target
        planner.target_steps(8 * SEC);
        assert_approx_eq!(f64, planner.evaluated_velocity, 30.0, epsilon = 1e-9);

        // the 5 s ramp ends at 11 s with the axis at rest at 300°
        planner.target_steps(11_500_000);
        assert_eq!(planner.evaluated_velocity, 0.0);
        let rest_position = planner.evaluated_position;
        assert_approx_eq!(f64, rest_position, 300.0, epsilon = 1e-3);

        // one more evaluation retires the latch, then the position profile
        // walks the axis back to zero
        planner.target_steps(11_600_000);
        let steps = planner.target_steps(60 * SEC);
        assert_eq!(planner.evaluated_position, 0.0);
        assert_eq!(planner.evaluated_velocity, 0.0);
        assert_eq!(steps, 0);
    }

    #[test]
    fn boundary_is_continuous_when_switching_to_position_mode() {
        let mut planner = MotionPlanner::new();
        planner.apply(&command(*b"tv", 50.0), 0);
        planner.target_steps(3 * SEC);
        let position_before = planner.evaluated_position;
        let velocity_before = planner.evaluated_velocity;

        planner.apply(&command(*b"tp", 720.0), 3 * SEC);
        planner.target_steps(3 * SEC);
        assert_eq!(planner.evaluated_position, position_before);
        assert_eq!(planner.evaluated_velocity, velocity_before);
    }

    #[test]
    fn repeated_evaluation_at_one_instant_is_idempotent() {
        let mut planner = planner_with_position_target(500.0);
        let first = planner.target_steps(4 * SEC);
        let second = planner.target_steps(4 * SEC);
        let third = planner.target_steps(4 * SEC);
        assert_eq!(first, second);
        assert_eq!(second, third);
    }

    #[test]
    fn conversion_truncates_toward_zero() {
        // a hair under one step in either direction stays at zero
        let mut planner = planner_with_position_target(-0.01);
        let steps = planner.target_steps(60 * SEC);
        assert_eq!(planner.evaluated_position, -0.01);
        assert_eq!(steps, 0);

        let mut planner = planner_with_position_target(0.01);
        assert_eq!(planner.target_steps(60 * SEC), 0);
    }

    #[test]
    fn enable_command_follows_nonzero_values() {
        let mut planner = MotionPlanner::new();
        planner.apply(&command(*b"en", 0.0), 0);
        assert!(!planner.is_enabled());
        planner.apply(&command(*b"en", 1.0), 0);
        assert!(planner.is_enabled());
    }

    #[test]
    fn limit_commands_reconfigure_the_profile() {
        let mut planner = MotionPlanner::new();
        planner.apply(&command(*b"mv", 45.0), 0);
        planner.apply(&command(*b"ma", 5.0), 0);
        planner.apply(&command(*b"sr", 12_345.9), 0);
        assert_eq!(planner.max_velocity, 45.0);
        assert_eq!(planner.max_acceleration, 5.0);
        assert_eq!(planner.steps_per_rev, 12_345);
    }

    #[test]
    fn non_positive_acceleration_is_refused() {
        let mut planner = MotionPlanner::new();
        planner.apply(&command(*b"ma", 0.0), 0);
        assert_eq!(planner.max_acceleration, 10.0);
        planner.apply(&command(*b"ma", -3.0), 0);
        assert_eq!(planner.max_acceleration, 10.0);
    }

    #[test]
    fn unknown_codes_are_ignored() {
        let mut planner = MotionPlanner::new();
        planner.apply(&command(*b"zz", 42.0), 0);
        assert!(planner.is_enabled());
        assert_eq!(planner.target_steps(SEC), 0);
    }
}
