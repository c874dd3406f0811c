// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

pub mod led;
pub mod pins;
pub mod tick_timer;
pub mod usart;

pub use led::Heartbeat;
pub use pins::BoardPins;
pub use tick_timer::TickTimer;
pub use usart::Usart;
