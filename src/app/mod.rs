//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the peripheral loop: acquisition, the periodic
//! read-display-blink cycle, and ordered teardown. All interaction with
//! hardware happens through **port traits** defined in [`ports`], keeping
//! this layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
