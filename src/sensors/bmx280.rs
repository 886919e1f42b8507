//! Bosch BMP280/BME280 temperature sensor over I2C.
//!
//! Temperature-only driver: probes the chip id, loads the factory
//! temperature calibration, and converts raw 20-bit readings with the
//! datasheet floating-point compensation. Pressure and humidity channels
//! are left disabled (oversampling "skipped").
//!
//! Generic over any [`embedded_hal::i2c::I2c`] bus, so the same code runs
//! against the ESP-IDF I2C driver on target and a scripted bus in tests.

use embedded_hal::i2c::I2c;
use log::{debug, info};

use crate::app::ports::SensorPort;
use crate::config::{Oversampling, SamplingMode};
use crate::error::IoError;

const REG_CHIP_ID: u8 = 0xD0;
const REG_CALIB_START: u8 = 0x88;
const REG_CTRL_MEAS: u8 = 0xF4;
const REG_TEMP_MSB: u8 = 0xFA;

const CHIP_ID_BMP280: u8 = 0x58;
const CHIP_ID_BME280: u8 = 0x60;

/// Raw value reported when the temperature measurement is disabled.
const TEMP_SKIPPED: i32 = 0x80000;

/// Readings outside this range cannot come from a working chip
/// (operational range is -40..85 °C, plus margin).
const PLAUSIBLE_C: core::ops::RangeInclusive<f32> = -45.0..=90.0;

/// Factory trimming for the temperature channel (registers 0x88-0x8D).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TempCalibration {
    pub dig_t1: u16,
    pub dig_t2: i16,
    pub dig_t3: i16,
}

/// An open BMP280/BME280 on one I2C bus.
#[derive(Debug)]
pub struct Bmx280<I2C> {
    i2c: I2C,
    addr: u8,
    calib: TempCalibration,
    closed: bool,
}

impl<I2C: I2c> Bmx280<I2C> {
    /// Identify the chip and load its calibration. Fails if the device
    /// does not answer or reports an unknown chip id.
    pub fn probe(i2c: I2C, addr: u8) -> Result<Self, IoError> {
        let mut sensor = Self {
            i2c,
            addr,
            calib: TempCalibration {
                dig_t1: 0,
                dig_t2: 0,
                dig_t3: 0,
            },
            closed: false,
        };

        let mut id = [0u8; 1];
        sensor
            .i2c
            .write_read(addr, &[REG_CHIP_ID], &mut id)
            .map_err(|e| {
                debug!("chip id read error: {e:?}");
                IoError::Read
            })?;
        if id[0] != CHIP_ID_BMP280 && id[0] != CHIP_ID_BME280 {
            debug!("unexpected chip id 0x{:02X} at 0x{addr:02X}", id[0]);
            return Err(IoError::InvalidData);
        }

        let mut raw = [0u8; 6];
        sensor
            .i2c
            .write_read(addr, &[REG_CALIB_START], &mut raw)
            .map_err(|e| {
                debug!("calibration read error: {e:?}");
                IoError::Read
            })?;
        sensor.calib = TempCalibration {
            dig_t1: u16::from_le_bytes([raw[0], raw[1]]),
            dig_t2: i16::from_le_bytes([raw[2], raw[3]]),
            dig_t3: i16::from_le_bytes([raw[4], raw[5]]),
        };

        info!(
            "BMx280 0x{:02X} online (chip id 0x{:02X})",
            sensor.addr, id[0]
        );
        Ok(sensor)
    }

    pub fn calibration(&self) -> TempCalibration {
        self.calib
    }

    fn write_ctrl_meas(&mut self, mode: SamplingMode, oversampling: Oversampling) -> Result<(), IoError> {
        let ctrl = (oversampling_bits(oversampling) << 5) | mode_bits(mode);
        self.i2c
            .write(self.addr, &[REG_CTRL_MEAS, ctrl])
            .map_err(|e| {
                debug!("ctrl_meas write error: {e:?}");
                IoError::Write
            })
    }
}

impl<I2C: I2c> SensorPort for Bmx280<I2C> {
    fn configure(
        &mut self,
        mode: SamplingMode,
        oversampling: Oversampling,
    ) -> Result<(), IoError> {
        if self.closed {
            return Err(IoError::Closed);
        }
        self.write_ctrl_meas(mode, oversampling)
    }

    fn read_celsius(&mut self) -> Result<f32, IoError> {
        if self.closed {
            return Err(IoError::Closed);
        }

        let mut raw = [0u8; 3];
        self.i2c
            .write_read(self.addr, &[REG_TEMP_MSB], &mut raw)
            .map_err(|e| {
                debug!("temperature read error: {e:?}");
                IoError::Read
            })?;
        let adc_t =
            (i32::from(raw[0]) << 12) | (i32::from(raw[1]) << 4) | (i32::from(raw[2]) >> 4);
        if adc_t == TEMP_SKIPPED {
            return Err(IoError::InvalidData);
        }

        let celsius = compensate(adc_t, &self.calib);
        if !PLAUSIBLE_C.contains(&celsius) {
            return Err(IoError::InvalidData);
        }
        Ok(celsius)
    }

    fn close(&mut self) -> Result<(), IoError> {
        if self.closed {
            return Err(IoError::Closed);
        }
        // Park the chip before letting the handle go.
        let parked = self.write_ctrl_meas(SamplingMode::Sleep, Oversampling::Skipped);
        self.closed = true;
        parked
    }
}

/// Datasheet floating-point temperature compensation (§8.1 of the BMP280
/// datasheet, `bmp280_compensate_T_double`).
pub(crate) fn compensate(adc_t: i32, calib: &TempCalibration) -> f32 {
    let var1 = (adc_t as f32 / 16384.0 - f32::from(calib.dig_t1) / 1024.0) * f32::from(calib.dig_t2);
    let d = adc_t as f32 / 131072.0 - f32::from(calib.dig_t1) / 8192.0;
    let var2 = d * d * f32::from(calib.dig_t3);
    (var1 + var2) / 5120.0
}

fn mode_bits(mode: SamplingMode) -> u8 {
    match mode {
        SamplingMode::Sleep => 0b00,
        SamplingMode::Forced => 0b01,
        SamplingMode::Normal => 0b11,
    }
}

fn oversampling_bits(oversampling: Oversampling) -> u8 {
    match oversampling {
        Oversampling::Skipped => 0b000,
        Oversampling::X1 => 0b001,
        Oversampling::X2 => 0b010,
        Oversampling::X4 => 0b011,
        Oversampling::X8 => 0b100,
        Oversampling::X16 => 0b101,
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
