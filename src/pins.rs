//! I2C addresses and wiring for the tempdisplay demo board.
//!
//! Single source of truth — the hardware adapter references this module
//! rather than hard-coding addresses.
//!
//! Wiring (ESP32-S3 DevKit):
//! - BMx280 sensor on I2C0: SDA = GPIO8, SCL = GPIO9
//! - HT16K33 display on I2C1: SDA = GPIO17, SCL = GPIO18
//! - Status LED (active HIGH) on GPIO4

/// BMx280 temperature sensor, SDO pulled high.
pub const SENSOR_I2C_ADDR: u8 = 0x77;

/// HT16K33 alphanumeric display, all address solder jumpers open.
pub const DISPLAY_I2C_ADDR: u8 = 0x70;

/// Both I2C buses run at standard speed.
pub const I2C_BAUDRATE_KHZ: u32 = 100;
