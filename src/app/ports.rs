//! Port traits — the hexagonal boundary between the loop and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ LoopController (domain)
//! ```
//!
//! Driven adapters (the sensor, the display, the LED line, the clock, the
//! event log) implement these traits. The
//! [`LoopController`](super::service::LoopController) consumes them via
//! generics, so the domain core never touches hardware directly.
//!
//! Handle discipline: each handle trait has a `close()`. Once a `close()`
//! returns `Ok`, the controller never calls the handle again; adapters may
//! additionally enforce this by returning [`IoError::Closed`].

use crate::config::{Oversampling, SamplingMode};
use crate::error::{AcquisitionError, IoError};

use super::events::AppEvent;

// ───────────────────────────────────────────────────────────────
// Peripheral handle ports (driven adapters: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// An open temperature sensor.
pub trait SensorPort {
    /// Apply sampling mode and oversampling. Called once during startup.
    fn configure(
        &mut self,
        mode: SamplingMode,
        oversampling: Oversampling,
    ) -> Result<(), IoError>;

    /// Take one temperature reading in degrees Celsius.
    fn read_celsius(&mut self) -> Result<f32, IoError>;

    /// Release the sensor.
    fn close(&mut self) -> Result<(), IoError>;
}

/// An open alphanumeric display.
pub trait DisplayPort {
    /// Switch the display on or off.
    fn set_enabled(&mut self, enabled: bool) -> Result<(), IoError>;

    /// Render a numeric value.
    fn show(&mut self, value: f32) -> Result<(), IoError>;

    /// Blank every character cell.
    fn clear(&mut self) -> Result<(), IoError>;

    /// Release the display.
    fn close(&mut self) -> Result<(), IoError>;
}

/// An open binary output line (the status LED).
pub trait OutputPort {
    /// Drive the line high or low.
    fn set_level(&mut self, high: bool) -> Result<(), IoError>;

    /// Release the line.
    fn close(&mut self) -> Result<(), IoError>;
}

// ───────────────────────────────────────────────────────────────
// Peripheral provider (driven adapter: board → handles)
// ───────────────────────────────────────────────────────────────

/// Opens the board's peripherals. Each `open_*` is called at most once;
/// the returned handles are exclusively owned by the controller until it
/// closes them.
pub trait PeripheralProvider {
    type Sensor: SensorPort;
    type Display: DisplayPort;
    type Output: OutputPort;

    fn open_sensor(&mut self) -> Result<Self::Sensor, AcquisitionError>;
    fn open_display(&mut self) -> Result<Self::Display, AcquisitionError>;
    fn open_output(&mut self) -> Result<Self::Output, AcquisitionError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port. Adapters
/// decide where they go (serial log, test recorder, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: domain → time source)
// ───────────────────────────────────────────────────────────────

/// Monotonic time for the drive loop.
///
/// `sleep_until` must not return before `now_ms()` has reached
/// `deadline_ms` — the drive loop relies on this to guarantee that a
/// popped entry is actually due. A test clock satisfies the contract by
/// jumping straight to the deadline.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin (boot, construction).
    fn now_ms(&self) -> u64;

    /// Block the logical worker until `deadline_ms`.
    fn sleep_until(&mut self, deadline_ms: u64);
}
