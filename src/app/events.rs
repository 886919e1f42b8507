//! Outbound application events.
//!
//! The [`LoopController`](super::service::LoopController) emits these
//! through the [`EventSink`](super::ports::EventSink) port. Adapters on
//! the other side decide what to do with them — log to serial, mirror to
//! a debug console, or record for assertions in tests.

use crate::error::IoError;

/// The three peripherals the controller owns, in acquisition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Peripheral {
    Sensor,
    Display,
    OutputLine,
}

impl core::fmt::Display for Peripheral {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Sensor => write!(f, "sensor"),
            Self::Display => write!(f, "display"),
            Self::OutputLine => write!(f, "output line"),
        }
    }
}

/// Structured events emitted by the loop controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppEvent {
    /// All peripherals acquired, the poll schedule is live.
    Started,

    /// A successful sensor reading, about to be shown on the display.
    Reading { celsius: f32 },

    /// The sensor read failed; this cycle's display refresh is skipped.
    ReadFailed(IoError),

    /// The reading could not be written to the display.
    DisplayWriteFailed(IoError),

    /// Teardown has begun; no further readings will be taken.
    ShutdownStarted,

    /// A peripheral was released cleanly.
    Released(Peripheral),

    /// A peripheral release failed; teardown continues regardless.
    ReleaseFailed {
        peripheral: Peripheral,
        error: IoError,
    },

    /// Teardown finished; every release was attempted exactly once.
    Terminated,
}
