// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin definitions for the STM32F777 rotary-stage driver board.

use stm32f7xx_hal::{
    gpio::{gpioa, gpiob, gpiod, Alternate, Output, PushPull},
    pac,
    prelude::*,
};

/// All board pins. Construct this once at startup using:
///
/// ```rust
/// let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOD);
/// ```
pub struct BoardPins {
    pub stepper: StepperPins,
    pub status_led: gpiod::PD10<Output<PushPull>>,
    pub usart1: Usart1Pins,
}

/// STEP/DIR/nENABLE lines to the stepper power stage.
pub struct StepperPins {
    pub step: gpioa::PA15<Output<PushPull>>,
    pub dir: gpiob::PB3<Output<PushPull>>,
    pub n_enable: gpiob::PB4<Output<PushPull>>,
}

/// USART1 (command link + debug console)
pub struct Usart1Pins {
    pub tx: gpioa::PA9<Alternate<7>>,
    pub rx: gpioa::PA10<Alternate<7>>,
}

impl BoardPins {
    pub fn new(gpioa: pac::GPIOA, gpiob: pac::GPIOB, gpiod: pac::GPIOD) -> Self {
        let gpioa = gpioa.split();
        let gpiob = gpiob.split();
        let gpiod = gpiod.split();

        Self {
            stepper: StepperPins {
                step: gpioa.pa15.into_push_pull_output(),
                dir: gpiob.pb3.into_push_pull_output(),
                n_enable: gpiob.pb4.into_push_pull_output(),
            },
            status_led: gpiod.pd10.into_push_pull_output(),
            usart1: Usart1Pins {
                tx: gpioa.pa9.into_alternate::<7>(),
                rx: gpioa.pa10.into_alternate::<7>(),
            },
        }
    }
}
