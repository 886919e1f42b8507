//! Hardware adapter — opens real peripherals behind the provider port.
//!
//! Owns the board's raw bus handles until the controller claims them.
//! This is the only module in the system that touches actual hardware;
//! each `open_*` hands the bus to the matching driver exactly once.

use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};
use esp_idf_hal::i2c::I2cDriver;
use log::error;

use crate::app::ports::PeripheralProvider;
use crate::config::LoopConfig;
use crate::drivers::ht16k33::AlphaDisplay;
use crate::drivers::led::StatusLed;
use crate::error::AcquisitionError;
use crate::pins;
use crate::sensors::bmx280::Bmx280;

/// Concrete provider for the demo board: BMx280 on I2C0, HT16K33 on
/// I2C1, status LED on a GPIO.
pub struct BoardPeripherals {
    sensor_i2c: Option<I2cDriver<'static>>,
    display_i2c: Option<I2cDriver<'static>>,
    led_pin: Option<PinDriver<'static, AnyOutputPin, Output>>,
    brightness: u8,
}

impl BoardPeripherals {
    pub fn new(
        sensor_i2c: I2cDriver<'static>,
        display_i2c: I2cDriver<'static>,
        led_pin: PinDriver<'static, AnyOutputPin, Output>,
        config: &LoopConfig,
    ) -> Self {
        Self {
            sensor_i2c: Some(sensor_i2c),
            display_i2c: Some(display_i2c),
            led_pin: Some(led_pin),
            brightness: config.display_brightness,
        }
    }
}

impl PeripheralProvider for BoardPeripherals {
    type Sensor = Bmx280<I2cDriver<'static>>;
    type Display = AlphaDisplay<I2cDriver<'static>>;
    type Output = StatusLed;

    fn open_sensor(&mut self) -> Result<Self::Sensor, AcquisitionError> {
        let i2c = self.sensor_i2c.take().ok_or_else(|| {
            error!("sensor bus already claimed");
            AcquisitionError::SensorOpen
        })?;
        Bmx280::probe(i2c, pins::SENSOR_I2C_ADDR).map_err(|e| {
            error!("sensor probe failed: {e}");
            AcquisitionError::SensorOpen
        })
    }

    fn open_display(&mut self) -> Result<Self::Display, AcquisitionError> {
        let i2c = self.display_i2c.take().ok_or_else(|| {
            error!("display bus already claimed");
            AcquisitionError::DisplayOpen
        })?;
        Ok(AlphaDisplay::new(
            i2c,
            pins::DISPLAY_I2C_ADDR,
            self.brightness,
        ))
    }

    fn open_output(&mut self) -> Result<Self::Output, AcquisitionError> {
        let pin = self.led_pin.take().ok_or_else(|| {
            error!("led pin already claimed");
            AcquisitionError::OutputOpen
        })?;
        Ok(StatusLed::new(pin))
    }
}
