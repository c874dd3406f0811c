// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Uptime tick timer on TIM2.
//!
//! TIM2 is prescaled to count microseconds and reloads every 1000 of them,
//! raising its update interrupt at 1 kHz. The interrupt advances the coarse
//! uptime tick counter; the live CNT register (0–999) is the fine
//! sub-counter the clock adds on top. TIM2's 32-bit counter is overkill for
//! a 0–999 range, but it is the timer the board leaves free.

use stm32f7xx_hal::pac;

use crate::config::TICK_PERIOD_US;

pub struct TickTimer {
    tim: pac::TIM2,
}

impl TickTimer {
    /// Configure TIM2 as the 1 kHz uptime tick source and start it.
    ///
    /// `timer_clock_hz` is the APB1 timer clock the prescaler divides down
    /// to 1 MHz (16 MHz with the default HSI configuration).
    pub fn new(tim: pac::TIM2, timer_clock_hz: u32) -> Self {
        // Gate the TIM2 peripheral clock on. RCC has already been constrained
        // for the clock tree, so reach the enable bit directly.
        unsafe {
            (*pac::RCC::ptr()).apb1enr.modify(|_, w| w.tim2en().set_bit());
        }

        // Disable counter while configuring
        tim.cr1.modify(|_, w| w.cen().clear_bit());

        // Count microseconds
        let prescale = timer_clock_hz / 1_000_000 - 1;
        tim.psc.write(|w| unsafe { w.psc().bits(prescale as u16) });

        // Reload every tick period
        tim.arr.write(|w| unsafe { w.bits(TICK_PERIOD_US as u32 - 1) });

        // Latch PSC/ARR by forcing an update, then clear the flag it sets so
        // the first interrupt marks a real tick
        tim.egr.write(|w| w.ug().set_bit());
        tim.sr.modify(|_, w| w.uif().clear_bit());

        // Interrupt on update (reload)
        tim.dier.modify(|_, w| w.uie().set_bit());

        // Reset and start the counter
        tim.cnt.write(|w| unsafe { w.bits(0) });
        tim.cr1.modify(|_, w| w.cen().set_bit());

        Self { tim }
    }

    /// Consume the wrapper and return the underlying timer peripheral.
    #[inline]
    pub fn free(self) -> pac::TIM2 {
        self.tim
    }
}

/// Read the fine sub-counter: microseconds within the current tick.
/// Readable from any context; the consistency protocol lives in
/// [`Uptime::now`](crate::time::Uptime::now).
#[inline]
pub fn sub_micros() -> u32 {
    unsafe { (*pac::TIM2::ptr()).cnt.read().bits() }
}

/// Acknowledge the update interrupt. Call from the TIM2 handler before
/// advancing the tick counter.
#[inline]
pub fn clear_update_flag() {
    unsafe {
        (*pac::TIM2::ptr()).sr.modify(|_, w| w.uif().clear_bit());
    }
}
