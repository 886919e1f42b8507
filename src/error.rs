//! Unified error types for the tempdisplay firmware.
//!
//! Two categories, with very different handling policies:
//!
//! - [`AcquisitionError`] — a peripheral failed to open or configure.
//!   Fatal to startup; logged, no recovery attempted.
//! - [`IoError`] — a read/write/close failed during steady-state operation
//!   or teardown. Always logged, never propagated past the control loop,
//!   never halts the schedule or the teardown sequence.
//!
//! All variants are `Copy` so they can be cheaply carried inside events
//! without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A peripheral could not be opened or configured during startup.
    Acquisition(AcquisitionError),
    /// A runtime read/write/close failed.
    Io(IoError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Acquisition(e) => write!(f, "acquisition: {e}"),
            Self::Io(e) => write!(f, "io: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Startup errors
// ---------------------------------------------------------------------------

/// A peripheral failed to open or configure. Raised only from
/// [`start`](crate::app::service::LoopController::start); the controller
/// does not release peripherals that were already opened when a later
/// open fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionError {
    /// The temperature sensor did not respond or identify itself.
    SensorOpen,
    /// The sensor rejected its sampling-mode/oversampling configuration.
    SensorConfig,
    /// The display did not respond.
    DisplayOpen,
    /// The display could not be switched on.
    DisplayEnable,
    /// The output line (LED GPIO) could not be claimed.
    OutputOpen,
}

impl fmt::Display for AcquisitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SensorOpen => write!(f, "sensor open failed"),
            Self::SensorConfig => write!(f, "sensor configure failed"),
            Self::DisplayOpen => write!(f, "display open failed"),
            Self::DisplayEnable => write!(f, "display enable failed"),
            Self::OutputOpen => write!(f, "output line open failed"),
        }
    }
}

impl From<AcquisitionError> for Error {
    fn from(e: AcquisitionError) -> Self {
        Self::Acquisition(e)
    }
}

// ---------------------------------------------------------------------------
// Runtime I/O errors
// ---------------------------------------------------------------------------

/// A peripheral read, write, or close failed at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoError {
    /// A bus or pin read returned an error.
    Read,
    /// A bus or pin write returned an error.
    Write,
    /// The peripheral returned data that cannot be valid (bad chip id,
    /// reading outside the physically plausible range).
    InvalidData,
    /// The handle was used after a successful `close()`.
    Closed,
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read failed"),
            Self::Write => write!(f, "write failed"),
            Self::InvalidData => write!(f, "invalid data"),
            Self::Closed => write!(f, "handle closed"),
        }
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Self::Io(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
