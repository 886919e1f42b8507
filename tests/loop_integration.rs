//! Integration tests: LoopController → ports, over a fake clock.
//!
//! The mock board records every port call in one shared, ordered log so
//! cross-handle ordering (acquisition order, release order, I/O after
//! termination) can be asserted globally.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use tempdisplay::app::events::{AppEvent, Peripheral};
use tempdisplay::app::ports::{
    Clock, DisplayPort, EventSink, OutputPort, PeripheralProvider, SensorPort,
};
use tempdisplay::app::service::{LoopController, Phase};
use tempdisplay::config::{LoopConfig, Oversampling, SamplingMode};
use tempdisplay::error::{AcquisitionError, IoError};
use tempdisplay::scheduler::{Task, TimerQueue};

// ── Mock implementations ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
enum Call {
    OpenSensor,
    Configure(SamplingMode, Oversampling),
    OpenDisplay,
    SetEnabled(bool),
    OpenOutput,
    Read,
    Show(f32),
    Clear,
    SetLevel(bool),
    CloseOutput,
    CloseDisplay,
    CloseSensor,
}

#[derive(Default)]
struct Shared {
    calls: Vec<Call>,
    /// Scripted read results; an exhausted script keeps returning 21.5.
    readings: VecDeque<Result<f32, IoError>>,
    fail_show: bool,
    fail_output_close: bool,
    fail_display_close: bool,
    fail_sensor_close: bool,
}

type SharedRef = Rc<RefCell<Shared>>;

struct MockSensor(SharedRef);
impl SensorPort for MockSensor {
    fn configure(&mut self, mode: SamplingMode, osr: Oversampling) -> Result<(), IoError> {
        self.0.borrow_mut().calls.push(Call::Configure(mode, osr));
        Ok(())
    }
    fn read_celsius(&mut self) -> Result<f32, IoError> {
        let mut s = self.0.borrow_mut();
        s.calls.push(Call::Read);
        s.readings.pop_front().unwrap_or(Ok(21.5))
    }
    fn close(&mut self) -> Result<(), IoError> {
        let mut s = self.0.borrow_mut();
        s.calls.push(Call::CloseSensor);
        if s.fail_sensor_close {
            Err(IoError::Write)
        } else {
            Ok(())
        }
    }
}

struct MockDisplay(SharedRef);
impl DisplayPort for MockDisplay {
    fn set_enabled(&mut self, enabled: bool) -> Result<(), IoError> {
        self.0.borrow_mut().calls.push(Call::SetEnabled(enabled));
        Ok(())
    }
    fn show(&mut self, value: f32) -> Result<(), IoError> {
        let mut s = self.0.borrow_mut();
        s.calls.push(Call::Show(value));
        if s.fail_show { Err(IoError::Write) } else { Ok(()) }
    }
    fn clear(&mut self) -> Result<(), IoError> {
        self.0.borrow_mut().calls.push(Call::Clear);
        Ok(())
    }
    fn close(&mut self) -> Result<(), IoError> {
        let mut s = self.0.borrow_mut();
        s.calls.push(Call::CloseDisplay);
        if s.fail_display_close {
            Err(IoError::Write)
        } else {
            Ok(())
        }
    }
}

struct MockOutput(SharedRef);
impl OutputPort for MockOutput {
    fn set_level(&mut self, high: bool) -> Result<(), IoError> {
        self.0.borrow_mut().calls.push(Call::SetLevel(high));
        Ok(())
    }
    fn close(&mut self) -> Result<(), IoError> {
        let mut s = self.0.borrow_mut();
        s.calls.push(Call::CloseOutput);
        if s.fail_output_close {
            Err(IoError::Write)
        } else {
            Ok(())
        }
    }
}

struct MockBoard {
    shared: SharedRef,
    fail_open: Option<Peripheral>,
}

impl MockBoard {
    fn new(shared: &SharedRef) -> Self {
        Self {
            shared: shared.clone(),
            fail_open: None,
        }
    }
}

impl PeripheralProvider for MockBoard {
    type Sensor = MockSensor;
    type Display = MockDisplay;
    type Output = MockOutput;

    fn open_sensor(&mut self) -> Result<MockSensor, AcquisitionError> {
        self.shared.borrow_mut().calls.push(Call::OpenSensor);
        if self.fail_open == Some(Peripheral::Sensor) {
            return Err(AcquisitionError::SensorOpen);
        }
        Ok(MockSensor(self.shared.clone()))
    }
    fn open_display(&mut self) -> Result<MockDisplay, AcquisitionError> {
        self.shared.borrow_mut().calls.push(Call::OpenDisplay);
        if self.fail_open == Some(Peripheral::Display) {
            return Err(AcquisitionError::DisplayOpen);
        }
        Ok(MockDisplay(self.shared.clone()))
    }
    fn open_output(&mut self) -> Result<MockOutput, AcquisitionError> {
        self.shared.borrow_mut().calls.push(Call::OpenOutput);
        if self.fail_open == Some(Peripheral::OutputLine) {
            return Err(AcquisitionError::OutputOpen);
        }
        Ok(MockOutput(self.shared.clone()))
    }
}

struct RecordingSink(Vec<AppEvent>);
impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.0.push(*event);
    }
}

/// Test clock: `sleep_until` jumps straight to the deadline.
struct FakeClock {
    now: u64,
}
impl Clock for FakeClock {
    fn now_ms(&self) -> u64 {
        self.now
    }
    fn sleep_until(&mut self, deadline_ms: u64) {
        self.now = self.now.max(deadline_ms);
    }
}

fn fixture() -> (SharedRef, MockBoard, RecordingSink, FakeClock) {
    let shared: SharedRef = Rc::new(RefCell::new(Shared::default()));
    let board = MockBoard::new(&shared);
    (shared, board, RecordingSink(Vec::new()), FakeClock { now: 0 })
}

fn calls_of(shared: &SharedRef) -> Vec<Call> {
    shared.borrow().calls.clone()
}

fn count(calls: &[Call], pred: impl Fn(&Call) -> bool) -> usize {
    calls.iter().filter(|c| pred(c)).count()
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn acquisition_order_and_configuration() {
    let (shared, mut board, mut sink, _clock) = fixture();
    let mut ctl = LoopController::new(LoopConfig::default());
    let mut timers = TimerQueue::new();

    ctl.start(&mut board, &mut timers, 0, &mut sink).unwrap();

    assert_eq!(
        calls_of(&shared),
        vec![
            Call::OpenSensor,
            Call::Configure(SamplingMode::Normal, Oversampling::X1),
            Call::OpenDisplay,
            Call::SetEnabled(true),
            Call::OpenOutput,
        ]
    );
    assert_eq!(ctl.phase(), Phase::Running);
    assert_eq!(sink.0, vec![AppEvent::Started]);
}

#[test]
fn failed_display_open_leaves_sensor_held_unreleased() {
    let (shared, mut board, mut sink, _clock) = fixture();
    board.fail_open = Some(Peripheral::Display);
    let mut ctl = LoopController::new(LoopConfig::default());
    let mut timers = TimerQueue::new();

    let err = ctl.start(&mut board, &mut timers, 0, &mut sink).unwrap_err();

    assert_eq!(err, AcquisitionError::DisplayOpen);
    assert_eq!(ctl.phase(), Phase::Uninitialized);
    assert!(timers.is_empty(), "no schedule on failed startup");
    let calls = calls_of(&shared);
    assert!(calls.contains(&Call::OpenSensor));
    // Startup is abandoned without releasing what was already opened.
    assert_eq!(count(&calls, |c| *c == Call::CloseSensor), 0);
}

// ── Poll cycle ────────────────────────────────────────────────

#[test]
fn two_ticks_display_each_reading_and_alternate_the_line() {
    let (shared, mut board, mut sink, _clock) = fixture();
    shared.borrow_mut().readings = VecDeque::from([Ok(21.5), Ok(21.6)]);
    let mut ctl = LoopController::new(LoopConfig::default());
    let mut timers = TimerQueue::new();
    ctl.start(&mut board, &mut timers, 0, &mut sink).unwrap();

    assert_eq!(timers.pop_due(0), Some(Task::Tick));
    ctl.tick(&mut timers, 0, &mut sink);
    assert!(ctl.state().led_on, "flag flips after the first tick");

    assert_eq!(timers.pop_due(300), Some(Task::Tick));
    ctl.tick(&mut timers, 300, &mut sink);
    assert!(!ctl.state().led_on);

    let calls = calls_of(&shared);
    let tail = &calls[5..]; // skip acquisition
    assert_eq!(
        tail,
        &[
            Call::Read,
            Call::Show(21.5),
            Call::SetLevel(false),
            Call::Read,
            Call::Show(21.6),
            Call::SetLevel(true),
        ]
    );
    assert!(sink.0.contains(&AppEvent::Reading { celsius: 21.5 }));
    assert!(sink.0.contains(&AppEvent::Reading { celsius: 21.6 }));
}

#[test]
fn failed_read_skips_display_but_still_toggles_and_reschedules() {
    let (shared, mut board, mut sink, _clock) = fixture();
    shared.borrow_mut().readings = VecDeque::from([Err(IoError::Read)]);
    let mut ctl = LoopController::new(LoopConfig::default());
    let mut timers = TimerQueue::new();
    ctl.start(&mut board, &mut timers, 0, &mut sink).unwrap();
    assert_eq!(timers.pop_due(0), Some(Task::Tick));

    ctl.tick(&mut timers, 0, &mut sink);

    let calls = calls_of(&shared);
    assert_eq!(count(&calls, |c| matches!(c, Call::Show(_))), 0);
    assert_eq!(count(&calls, |c| *c == Call::SetLevel(false)), 1);
    assert!(ctl.state().led_on, "flag flips even on a failed read");
    assert_eq!(
        timers.next_deadline(),
        Some(300),
        "next tick still scheduled"
    );
    assert!(sink.0.contains(&AppEvent::ReadFailed(IoError::Read)));
}

#[test]
fn failed_display_write_does_not_stop_the_schedule() {
    let (shared, mut board, mut sink, _clock) = fixture();
    shared.borrow_mut().fail_show = true;
    let mut ctl = LoopController::new(LoopConfig::default());
    let mut timers = TimerQueue::new();
    ctl.start(&mut board, &mut timers, 0, &mut sink).unwrap();
    assert_eq!(timers.pop_due(0), Some(Task::Tick));

    ctl.tick(&mut timers, 0, &mut sink);

    assert!(sink.0.contains(&AppEvent::DisplayWriteFailed(IoError::Write)));
    assert!(ctl.state().led_on);
    assert_eq!(timers.next_deadline(), Some(300));
}

// ── Teardown ──────────────────────────────────────────────────

#[test]
fn release_order_is_reverse_of_acquisition() {
    let (shared, mut board, mut sink, _clock) = fixture();
    let mut ctl = LoopController::new(LoopConfig::default());
    let mut timers = TimerQueue::new();
    ctl.start(&mut board, &mut timers, 0, &mut sink).unwrap();

    ctl.shutdown(&mut sink);

    let calls = calls_of(&shared);
    assert_eq!(
        &calls[5..],
        &[
            Call::SetLevel(false),
            Call::CloseOutput,
            Call::Clear,
            Call::CloseDisplay,
            Call::CloseSensor,
        ]
    );
    assert_eq!(
        sink.0,
        vec![
            AppEvent::Started,
            AppEvent::ShutdownStarted,
            AppEvent::Released(Peripheral::OutputLine),
            AppEvent::Released(Peripheral::Display),
            AppEvent::Released(Peripheral::Sensor),
            AppEvent::Terminated,
        ]
    );
}

#[test]
fn failed_release_does_not_stop_the_remaining_releases() {
    let (shared, mut board, mut sink, _clock) = fixture();
    shared.borrow_mut().fail_output_close = true;
    let mut ctl = LoopController::new(LoopConfig::default());
    let mut timers = TimerQueue::new();
    ctl.start(&mut board, &mut timers, 0, &mut sink).unwrap();

    ctl.shutdown(&mut sink);

    let calls = calls_of(&shared);
    assert_eq!(count(&calls, |c| *c == Call::CloseOutput), 1);
    assert_eq!(count(&calls, |c| *c == Call::Clear), 1);
    assert_eq!(count(&calls, |c| *c == Call::CloseDisplay), 1);
    assert_eq!(count(&calls, |c| *c == Call::CloseSensor), 1);
    assert!(sink.0.contains(&AppEvent::ReleaseFailed {
        peripheral: Peripheral::OutputLine,
        error: IoError::Write,
    }));
    assert!(sink.0.contains(&AppEvent::Released(Peripheral::Display)));
    assert!(sink.0.contains(&AppEvent::Released(Peripheral::Sensor)));
}

#[test]
fn shutdown_is_idempotent_and_releases_exactly_once() {
    let (shared, mut board, mut sink, _clock) = fixture();
    shared.borrow_mut().fail_sensor_close = true;
    let mut ctl = LoopController::new(LoopConfig::default());
    let mut timers = TimerQueue::new();
    ctl.start(&mut board, &mut timers, 0, &mut sink).unwrap();

    ctl.shutdown(&mut sink);
    ctl.shutdown(&mut sink);
    ctl.shutdown(&mut sink);

    let calls = calls_of(&shared);
    assert_eq!(count(&calls, |c| *c == Call::CloseOutput), 1);
    assert_eq!(count(&calls, |c| *c == Call::CloseDisplay), 1);
    assert_eq!(count(&calls, |c| *c == Call::CloseSensor), 1);
    assert_eq!(
        sink.0
            .iter()
            .filter(|e| **e == AppEvent::Terminated)
            .count(),
        1
    );
}

#[test]
fn ticks_after_termination_do_no_io() {
    let (shared, mut board, mut sink, _clock) = fixture();
    let mut ctl = LoopController::new(LoopConfig::default());
    let mut timers = TimerQueue::new();
    ctl.start(&mut board, &mut timers, 0, &mut sink).unwrap();
    ctl.shutdown(&mut sink);

    let before = calls_of(&shared).len();
    let led_before = ctl.state().led_on;
    let queue_before = timers.len();

    ctl.tick(&mut timers, 5_100, &mut sink);

    assert_eq!(calls_of(&shared).len(), before, "no I/O after termination");
    assert_eq!(ctl.state().led_on, led_before, "no toggle either");
    assert_eq!(timers.len(), queue_before, "and no reschedule");
}

// ── Full run over the fake clock ──────────────────────────────

#[test]
fn run_polls_until_the_five_second_shutdown() {
    let (shared, mut board, mut sink, mut clock) = fixture();
    let mut ctl = LoopController::new(LoopConfig::default());

    ctl.run(&mut board, &mut clock, &mut sink).unwrap();

    // Ticks land at 0, 300, ..., 4800; the shutdown task fires at 5000
    // and the tick left over at 5100 is a no-op.
    let calls = calls_of(&shared);
    assert_eq!(count(&calls, |c| *c == Call::Read), 17);
    assert_eq!(count(&calls, |c| matches!(c, Call::Show(_))), 17);
    assert_eq!(ctl.tick_count(), 17);
    assert!(ctl.is_terminated());

    // Line levels strictly alternate across ticks, then the teardown
    // parks the line low.
    let levels: Vec<bool> = calls
        .iter()
        .filter_map(|c| match c {
            Call::SetLevel(v) => Some(*v),
            _ => None,
        })
        .collect();
    assert_eq!(levels.len(), 18);
    for (i, level) in levels[..17].iter().enumerate() {
        assert_eq!(*level, i % 2 == 1, "tick {i}");
    }
    assert!(!levels[17], "teardown drives the line low");

    // Teardown ordering holds in the full run too.
    let close_positions: Vec<usize> = calls
        .iter()
        .enumerate()
        .filter_map(|(i, c)| {
            matches!(c, Call::CloseOutput | Call::CloseDisplay | Call::CloseSensor).then_some(i)
        })
        .collect();
    assert_eq!(close_positions.len(), 3);
    assert!(close_positions.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(calls[close_positions[0]], Call::CloseOutput);
    assert_eq!(calls[close_positions[1]], Call::CloseDisplay);
    assert_eq!(calls[close_positions[2]], Call::CloseSensor);

    // The late no-op tick still advanced the clock past the deadline.
    assert_eq!(clock.now, 5_100);
}

#[test]
fn run_with_flaky_sensor_still_terminates_cleanly() {
    let (shared, mut board, mut sink, mut clock) = fixture();
    shared.borrow_mut().readings =
        VecDeque::from([Ok(20.0), Err(IoError::Read), Err(IoError::InvalidData), Ok(20.3)]);
    let mut ctl = LoopController::new(LoopConfig::default());

    ctl.run(&mut board, &mut clock, &mut sink).unwrap();

    let calls = calls_of(&shared);
    assert_eq!(count(&calls, |c| *c == Call::Read), 17);
    // Two failed cycles skip their display refresh.
    assert_eq!(count(&calls, |c| matches!(c, Call::Show(_))), 15);
    // The line is driven on every tick regardless.
    assert_eq!(count(&calls, |c| matches!(c, Call::SetLevel(_))), 18);
    assert!(ctl.is_terminated());
}
