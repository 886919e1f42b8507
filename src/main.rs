//! Tempdisplay Firmware — Main Entry Point
//!
//! Hexagonal architecture on one thread, one timer queue:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                   │
//! │                                                            │
//! │  BoardPeripherals      LogEventSink       SystemClock      │
//! │  (PeripheralProvider)  (EventSink)        (Clock)          │
//! │                                                            │
//! │  ─────────────── Port Trait Boundary ───────────────       │
//! │                                                            │
//! │  ┌──────────────────────────────────────────────────┐      │
//! │  │          LoopController (pure logic)             │      │
//! │  │  acquire · poll/display/blink · timed teardown   │      │
//! │  └──────────────────────────────────────────────────┘      │
//! │                                                            │
//! │  TimerQueue (deadline-ordered, single worker)              │
//! └────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::gpio::{OutputPin, PinDriver};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::prelude::*;
use log::{error, info};

use tempdisplay::adapters::hardware::BoardPeripherals;
use tempdisplay::adapters::log_sink::LogEventSink;
use tempdisplay::adapters::time::SystemClock;
use tempdisplay::app::service::LoopController;
use tempdisplay::config::LoopConfig;
use tempdisplay::pins;

fn main() -> Result<()> {
    // ── ESP-IDF bootstrap ─────────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("tempdisplay v{}", env!("CARGO_PKG_VERSION"));

    let config = LoopConfig::default();

    // ── Raw peripherals: two I2C buses and the LED pin ────────
    let p = Peripherals::take()?;
    let i2c_config = I2cConfig::new().baudrate(pins::I2C_BAUDRATE_KHZ.kHz().into());
    let sensor_i2c = I2cDriver::new(p.i2c0, p.pins.gpio8, p.pins.gpio9, &i2c_config)?;
    let display_i2c = I2cDriver::new(p.i2c1, p.pins.gpio17, p.pins.gpio18, &i2c_config)?;
    let led_pin = PinDriver::output(p.pins.gpio4.downgrade_output())?;

    // ── Adapters and controller ───────────────────────────────
    let mut board = BoardPeripherals::new(sensor_i2c, display_i2c, led_pin, &config);
    let mut clock = SystemClock::new();
    let mut sink = LogEventSink::new();
    let mut controller = LoopController::new(config);

    // Acquisition failure is fatal to the demo: log it and exit.
    // Everything after startup is handled inside the loop.
    if let Err(e) = controller.run(&mut board, &mut clock, &mut sink) {
        error!("startup failed: {e}");
    }

    info!("demo complete");
    Ok(())
}
