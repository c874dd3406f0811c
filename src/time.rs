// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Monotonic microsecond uptime clock.
//!
//! A hardware timer ticks at 1 kHz and its interrupt advances a coarse tick
//! counter; between interrupts the same timer's counter register counts
//! 0–999 µs. Adding the two yields exact microseconds since boot at any
//! point.
//!
//! The tick counter is advanced asynchronously, so a naive coarse-then-fine
//! read can pair a stale tick count with a freshly wrapped sub-counter.
//! [`Uptime::now`] re-reads the tick count after sampling the sub-counter
//! and retries until both reads agree, which bounds the result to a
//! consistent snapshot. A read cannot fail; it can only be slow, and the
//! retry is expected to resolve within one or two iterations.

use core::sync::atomic::{AtomicU32, Ordering};

use embedded_hal::blocking::delay::DelayUs;

use crate::config::TICK_PERIOD_US;

/// Source of the fine sub-tick count.
pub trait SubTick {
    /// Microseconds elapsed within the current tick (`0..TICK_PERIOD_US`).
    fn sub_micros(&self) -> u32;
}

impl<F> SubTick for F
where
    F: Fn() -> u32,
{
    fn sub_micros(&self) -> u32 {
        self()
    }
}

/// Monotonic microsecond clock handle.
///
/// The coarse tick counter is shared with the timer interrupt, which is the
/// one piece of cross-context state in the firmware; everything else runs
/// on the main execution context.
pub struct Uptime<'a, S> {
    ticks: &'a AtomicU32,
    sub: S,
}

impl<'a, S: SubTick> Uptime<'a, S> {
    pub const fn new(ticks: &'a AtomicU32, sub: S) -> Self {
        Self { ticks, sub }
    }

    /// Advance the coarse counter by one tick period. Called from the tick
    /// timer interrupt.
    #[inline]
    pub fn tick(&self) {
        self.ticks.fetch_add(1, Ordering::Release);
    }

    /// Elapsed microseconds since boot.
    ///
    /// The sub-counter can wrap (and the tick counter advance) between the
    /// two reads; when the surrounding tick-count reads disagree the whole
    /// sequence is retried.
    pub fn now(&self) -> u64 {
        loop {
            let ticks = self.ticks.load(Ordering::Acquire);
            let sub = self.sub.sub_micros();
            if self.ticks.load(Ordering::Acquire) == ticks {
                return u64::from(ticks) * TICK_PERIOD_US + u64::from(sub);
            }
        }
    }

    /// Busy-wait until `now()` reaches `deadline_us`. No suspension and no
    /// yielding; only used for microsecond-scale hardware settle delays.
    pub fn block_until(&self, deadline_us: u64) {
        while self.now() < deadline_us {}
    }
}

/// Adapter exposing [`Uptime`] as an `embedded-hal` microsecond delay.
pub struct UptimeDelay<'a, S: SubTick>(pub &'a Uptime<'a, S>);

impl<S: SubTick> DelayUs<u32> for UptimeDelay<'_, S> {
    fn delay_us(&mut self, us: u32) {
        let deadline = self.0.now() + u64::from(us);
        self.0.block_until(deadline);
    }
}
