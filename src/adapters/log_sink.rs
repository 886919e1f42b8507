//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART / USB-CDC in production). Tests use their own
//! recording sinks instead.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => {
                info!("START | peripherals online, poll schedule armed");
            }
            AppEvent::Reading { celsius } => {
                info!("READ  | {celsius:.1}\u{00b0}C");
            }
            AppEvent::ReadFailed(e) => {
                warn!("READ  | sensor failed: {e}");
            }
            AppEvent::DisplayWriteFailed(e) => {
                warn!("SHOW  | display failed: {e}");
            }
            AppEvent::ShutdownStarted => {
                info!("STOP  | releasing peripherals");
            }
            AppEvent::Released(p) => {
                info!("STOP  | {p} released");
            }
            AppEvent::ReleaseFailed { peripheral, error } => {
                warn!("STOP  | {peripheral} release failed: {error}");
            }
            AppEvent::Terminated => {
                info!("STOP  | terminated");
            }
        }
    }
}
