//! Status LED driver — one GPIO output line.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives a GPIO pin via `esp-idf-hal`'s `PinDriver`.
//! On host/test: tracks the level in memory only.

use log::debug;

use crate::app::ports::OutputPort;
use crate::error::IoError;

#[cfg(target_os = "espidf")]
use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};

/// An open, exclusively-owned output line.
pub struct StatusLed {
    #[cfg(target_os = "espidf")]
    pin: PinDriver<'static, AnyOutputPin, Output>,
    on: bool,
    closed: bool,
}

#[cfg(target_os = "espidf")]
impl StatusLed {
    pub fn new(pin: PinDriver<'static, AnyOutputPin, Output>) -> Self {
        Self {
            pin,
            on: false,
            closed: false,
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl StatusLed {
    pub fn new() -> Self {
        Self {
            on: false,
            closed: false,
        }
    }
}

impl StatusLed {
    /// Last level the line was driven to.
    pub fn is_on(&self) -> bool {
        self.on
    }
}

impl OutputPort for StatusLed {
    fn set_level(&mut self, high: bool) -> Result<(), IoError> {
        if self.closed {
            return Err(IoError::Closed);
        }
        #[cfg(target_os = "espidf")]
        {
            let level = if high {
                self.pin.set_high()
            } else {
                self.pin.set_low()
            };
            level.map_err(|e| {
                debug!("gpio write error: {e:?}");
                IoError::Write
            })?;
        }
        self.on = high;
        Ok(())
    }

    fn close(&mut self) -> Result<(), IoError> {
        if self.closed {
            return Err(IoError::Closed);
        }
        debug!("output line closed");
        self.closed = true;
        self.on = false;
        Ok(())
    }
}
