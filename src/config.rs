//! System configuration parameters
//!
//! All tunable parameters for the tempdisplay demo. The values mirror the
//! board's intended behaviour: poll the sensor roughly three times a
//! second, run for five seconds, then shut everything down.

use serde::{Deserialize, Serialize};

/// BMx280 power/sampling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SamplingMode {
    /// No measurements; registers readable, lowest power.
    Sleep,
    /// One measurement on demand, then back to sleep.
    Forced,
    /// Continuous free-running measurements.
    Normal,
}

/// BMx280 temperature oversampling setting. Higher settings average more
/// internal samples per reading (accuracy vs. speed trade-off).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Oversampling {
    /// Measurement skipped entirely; reads return the reset value.
    Skipped,
    X1,
    X2,
    X4,
    X8,
    X16,
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopConfig {
    // --- Timing ---
    /// Poll interval between display refreshes (milliseconds)
    pub tick_interval_ms: u32,
    /// Wall-clock runtime before automatic shutdown (milliseconds)
    pub run_duration_ms: u32,

    // --- Sensor ---
    /// Sampling mode applied at startup
    pub sampling_mode: SamplingMode,
    /// Temperature oversampling applied at startup
    pub oversampling: Oversampling,

    // --- Display ---
    /// HT16K33 dimming level (0-15, 15 = full brightness)
    pub display_brightness: u8,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 300,
            run_duration_ms: 5_000,
            sampling_mode: SamplingMode::Normal,
            oversampling: Oversampling::X1,
            display_brightness: 15,
        }
    }
}
