//! Peripheral loop controller — the hexagonal core.
//!
//! [`LoopController`] owns the three peripheral handles and the loop
//! state, and exposes a clean, hardware-agnostic API. All I/O flows
//! through port traits injected at call sites, making the entire
//! controller testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                 │     LoopController      │
//! DisplayPort ◀──│  acquire · poll · release│
//!  OutputPort ◀──└────────────────────────┘
//! ```
//!
//! Lifecycle: `Uninitialized → Running → Terminated`, one way. The
//! shutdown task fires after a fixed runtime; an embedder can also call
//! [`shutdown`](LoopController::shutdown) directly (application exit).
//! Either way, any poll tick still sitting in the timer queue observes
//! the terminated flag and becomes a no-op.

use log::{error, info, warn};

use crate::config::LoopConfig;
use crate::error::AcquisitionError;
use crate::scheduler::{Task, TimerQueue};

use super::events::{AppEvent, Peripheral};
use super::ports::{Clock, DisplayPort, EventSink, OutputPort, PeripheralProvider, SensorPort};

// ───────────────────────────────────────────────────────────────
// Loop state
// ───────────────────────────────────────────────────────────────

/// Mutable state of the poll loop, updated only by the loop itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopState {
    /// Level the output line will be driven to on the next tick.
    /// Alternates once per tick, whether or not the tick's I/O succeeded.
    pub led_on: bool,
    /// Latches true exactly once; ticks popped afterwards do nothing.
    pub terminated: bool,
}

/// Controller lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Running,
    Terminated,
}

// ───────────────────────────────────────────────────────────────
// LoopController
// ───────────────────────────────────────────────────────────────

/// Orchestrates acquisition, the periodic poll cycle, and teardown.
pub struct LoopController<P: PeripheralProvider> {
    config: LoopConfig,
    state: LoopState,
    phase: Phase,
    sensor: Option<P::Sensor>,
    display: Option<P::Display>,
    output: Option<P::Output>,
    tick_count: u64,
}

impl<P: PeripheralProvider> LoopController<P> {
    pub fn new(config: LoopConfig) -> Self {
        Self {
            config,
            state: LoopState::default(),
            phase: Phase::Uninitialized,
            sensor: None,
            display: None,
            output: None,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Acquire sensor, display, and output line — in that order — then
    /// arm the shutdown timer and the first poll tick.
    ///
    /// On a partial failure the handles opened so far stay held but are
    /// NOT released; startup is simply abandoned. Acquisition is fatal,
    /// so nothing else will touch them.
    pub fn start(
        &mut self,
        provider: &mut P,
        timers: &mut TimerQueue,
        now_ms: u64,
        sink: &mut impl EventSink,
    ) -> Result<(), AcquisitionError> {
        info!("acquiring peripherals: sensor, display, output line");

        let sensor = self.sensor.insert(provider.open_sensor()?);
        if let Err(e) = sensor.configure(self.config.sampling_mode, self.config.oversampling) {
            error!("sensor configure failed: {e}");
            return Err(AcquisitionError::SensorConfig);
        }

        let display = self.display.insert(provider.open_display()?);
        if let Err(e) = display.set_enabled(true) {
            error!("display enable failed: {e}");
            return Err(AcquisitionError::DisplayEnable);
        }

        self.output = Some(provider.open_output()?);

        self.phase = Phase::Running;
        sink.emit(&AppEvent::Started);
        info!(
            "running: poll every {}ms, shutdown after {}ms",
            self.config.tick_interval_ms, self.config.run_duration_ms
        );

        timers.schedule(Task::Shutdown, now_ms, u64::from(self.config.run_duration_ms));
        timers.schedule(Task::Tick, now_ms, 0);
        Ok(())
    }

    // ── Poll cycle ────────────────────────────────────────────

    /// One poll cycle: read the sensor, refresh the display, drive the
    /// output line, toggle, reschedule.
    ///
    /// A failed read skips the display refresh for this cycle only; the
    /// output line is still driven, the blink flag still toggles, and the
    /// next tick is still scheduled. A failed display or line write is
    /// logged and otherwise ignored.
    pub fn tick(&mut self, timers: &mut TimerQueue, now_ms: u64, sink: &mut impl EventSink) {
        if self.state.terminated {
            return;
        }
        let (Some(sensor), Some(display), Some(output)) = (
            self.sensor.as_mut(),
            self.display.as_mut(),
            self.output.as_mut(),
        ) else {
            return; // Not started.
        };
        self.tick_count += 1;

        match sensor.read_celsius() {
            Ok(celsius) => {
                sink.emit(&AppEvent::Reading { celsius });
                if let Err(e) = display.show(celsius) {
                    warn!("display write failed: {e}");
                    sink.emit(&AppEvent::DisplayWriteFailed(e));
                }
            }
            Err(e) => {
                warn!("sensor read failed: {e}; display keeps its last value");
                sink.emit(&AppEvent::ReadFailed(e));
            }
        }

        if let Err(e) = output.set_level(self.state.led_on) {
            warn!("output line write failed: {e}");
        }
        self.state.led_on = !self.state.led_on;

        timers.schedule(Task::Tick, now_ms, u64::from(self.config.tick_interval_ms));
    }

    // ── Teardown ──────────────────────────────────────────────

    /// Terminate the loop and release every peripheral in reverse
    /// acquisition order: output line, display, sensor.
    ///
    /// Idempotent — the second and later calls return immediately, so
    /// each release runs at most once. A failed release is logged and
    /// does not stop the remaining releases.
    pub fn shutdown(&mut self, sink: &mut impl EventSink) {
        if self.state.terminated {
            return;
        }
        self.state.terminated = true;
        self.phase = Phase::Terminated;
        info!("shutting down: releasing output line, display, sensor");
        sink.emit(&AppEvent::ShutdownStarted);

        if let Some(mut output) = self.output.take() {
            let released = output.set_level(false).and_then(|()| output.close());
            report_release(Peripheral::OutputLine, released, sink);
        }

        if let Some(mut display) = self.display.take() {
            let released = display.clear().and_then(|()| display.close());
            report_release(Peripheral::Display, released, sink);
        }

        if let Some(mut sensor) = self.sensor.take() {
            report_release(Peripheral::Sensor, sensor.close(), sink);
        }

        sink.emit(&AppEvent::Terminated);
        info!("terminated after {} ticks", self.tick_count);
    }

    // ── Drive loop ────────────────────────────────────────────

    /// Start the controller and drive the timer queue to completion on
    /// the calling thread.
    ///
    /// Every callback runs to completion before the next one fires;
    /// entries fire in deadline order. The loop ends once the queue
    /// drains — after the shutdown task has fired, any remaining tick is
    /// a no-op that schedules nothing, so drain is guaranteed. The final
    /// `shutdown` call covers an embedder that empties the queue some
    /// other way; it does nothing if teardown already ran.
    pub fn run(
        &mut self,
        provider: &mut P,
        clock: &mut impl Clock,
        sink: &mut impl EventSink,
    ) -> Result<(), AcquisitionError> {
        let mut timers = TimerQueue::new();
        self.start(provider, &mut timers, clock.now_ms(), sink)?;

        while let Some(deadline) = timers.next_deadline() {
            clock.sleep_until(deadline);
            let now = clock.now_ms();
            while let Some(task) = timers.pop_due(now) {
                match task {
                    Task::Tick => self.tick(&mut timers, now, sink),
                    Task::Shutdown => self.shutdown(sink),
                }
            }
        }

        self.shutdown(sink);
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_terminated(&self) -> bool {
        self.state.terminated
    }

    /// Total poll cycles that performed I/O (no-op ticks don't count).
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

/// Log and emit the outcome of one release step.
fn report_release(
    peripheral: Peripheral,
    released: Result<(), crate::error::IoError>,
    sink: &mut impl EventSink,
) {
    match released {
        Ok(()) => {
            info!("{peripheral} released");
            sink.emit(&AppEvent::Released(peripheral));
        }
        Err(error) => {
            warn!("{peripheral} release failed: {error}");
            sink.emit(&AppEvent::ReleaseFailed { peripheral, error });
        }
    }
}
