// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Firmware entry point.
//!
//! Brings up the board, wires the two asynchronous producers (uptime tick
//! interrupt, USART receive interrupt), and runs the fixed-period control
//! loop. Received bytes cross from the interrupt to the loop through a
//! bounded single-producer/single-consumer queue; the parser and command
//! filter run entirely in the loop context.

#![no_main]
#![no_std]

use core::cell::RefCell;
use core::sync::atomic::{AtomicU32, Ordering};

use cortex_m::interrupt::Mutex;
use cortex_m_rt::entry;
use panic_halt as _;

use embedded_hal::serial::Read;
use heapless::spsc::{Producer, Queue};

use hal::{
    pac::{self, interrupt},
    prelude::*,
    serial::{self, Config, Serial},
};
use stm32f7xx_hal as hal;

use rotostage::config::{CONTROL_PERIOD_US, RX_QUEUE_DEPTH};
use rotostage::control::StepController;
use rotostage::drivers::StepDir;
use rotostage::hw::{tick_timer, BoardPins, Heartbeat, TickTimer, Usart};
use rotostage::protocol::Parser;
use rotostage::time::{Uptime, UptimeDelay};

/// Coarse uptime tick count, advanced by the TIM2 interrupt.
static UPTIME_TICKS: AtomicU32 = AtomicU32::new(0);

/// Byte queue between the USART1 receive interrupt and the control loop.
static mut RX_QUEUE: Queue<u8, RX_QUEUE_DEPTH> = Queue::new();
static RX_PRODUCER: Mutex<RefCell<Option<Producer<'static, u8, RX_QUEUE_DEPTH>>>> =
    Mutex::new(RefCell::new(None));
static SERIAL_RX: Mutex<RefCell<Option<serial::Rx<pac::USART1>>>> =
    Mutex::new(RefCell::new(None));

#[entry]
fn main() -> ! {
    // Peripherals
    let dp = pac::Peripherals::take().unwrap();

    // Clocks
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze();

    // GPIO
    let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOD);

    // USART1: command input + debug console
    let usart_cfg = Config {
        baud_rate: 115_200.bps(),
        ..Default::default()
    };
    let mut serial = Serial::new(
        dp.USART1,
        (pins.usart1.tx, pins.usart1.rx),
        &clocks,
        usart_cfg,
    );
    serial.listen(serial::Event::Rxne);
    let (mut console, rx) = Usart::split(serial);

    // Hand the RX half and the queue producer to the receive interrupt
    let (rx_producer, mut rx_bytes) = unsafe { RX_QUEUE.split() };
    cortex_m::interrupt::free(|cs| {
        RX_PRODUCER.borrow(cs).replace(Some(rx_producer));
        SERIAL_RX.borrow(cs).replace(Some(rx));
    });

    // 1 kHz uptime tick on TIM2 (16 MHz APB1 timer clock with the default
    // HSI configuration)
    let _tick_timer = TickTimer::new(dp.TIM2, 16_000_000);
    let uptime = Uptime::new(&UPTIME_TICKS, tick_timer::sub_micros);

    unsafe {
        pac::NVIC::unmask(pac::Interrupt::TIM2);
        pac::NVIC::unmask(pac::Interrupt::USART1);
    }

    // Stepper driver and the control loop around it
    let driver = StepDir::new(
        pins.stepper.step,
        pins.stepper.dir,
        pins.stepper.n_enable,
        UptimeDelay(&uptime),
    );
    let mut controller = StepController::new(driver);
    let mut parser = Parser::new();
    let mut heartbeat = Heartbeat::active_low(pins.status_led);

    console.println("rotostage ready");

    let mut next_tick = uptime.now();
    loop {
        next_tick += CONTROL_PERIOD_US;
        uptime.block_until(next_tick);

        while let Some(byte) = rx_bytes.dequeue() {
            parser.consume_byte(byte);
        }

        controller.tick(&mut parser, uptime.now());
        heartbeat.update(uptime.now());
    }
}

#[interrupt]
fn TIM2() {
    tick_timer::clear_update_flag();
    UPTIME_TICKS.fetch_add(1, Ordering::Release);
}

#[interrupt]
fn USART1() {
    cortex_m::interrupt::free(|cs| {
        let mut rx = SERIAL_RX.borrow(cs).borrow_mut();
        let mut producer = RX_PRODUCER.borrow(cs).borrow_mut();
        if let (Some(rx), Some(producer)) = (rx.as_mut(), producer.as_mut()) {
            // drain everything pending; bytes are dropped if the loop ever
            // falls a full queue behind
            while let Ok(byte) = rx.read() {
                let _ = producer.enqueue(byte);
            }
        }
    });
}
