//! Sensor drivers.

pub mod bmx280;
