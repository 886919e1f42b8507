//! Timer/scheduler engine.
//!
//! A delay-based timer queue on a single logical worker, replacing a
//! host-provided `post_delayed` facility:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      TimerQueue                              │
//! │   ┌───────────────┬───────────────┬───────────────┐          │
//! │   │ Tick @ 300ms  │ Tick @ 600ms  │ Shutdown @ 5s │  ...     │
//! │   └───────┬───────┴───────────────┴───────────────┘          │
//! │           │ pop_due(now)                                     │
//! │           ▼                                                  │
//! │   drive loop: sleep until next deadline, dispatch,           │
//! │   run callback to completion, repeat                         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Entries fire in deadline order; entries sharing a deadline fire in the
//! order they were scheduled. The queue never cancels an entry — a task
//! whose work has been obsoleted (e.g. a poll tick scheduled before
//! shutdown) still pops and is expected to check a flag and return.

use log::debug;

// ═══════════════════════════════════════════════════════════════
//  Tasks
// ═══════════════════════════════════════════════════════════════

/// What a queue entry does when it fires. A closed enum rather than a
/// boxed callback keeps dispatch explicit and the queue trivially
/// inspectable in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// One poll cycle: read the sensor, refresh the display, blink.
    Tick,
    /// Terminate the loop and release every peripheral.
    Shutdown,
}

#[derive(Debug)]
struct TimerEntry {
    deadline_ms: u64,
    /// Insertion order, used to break deadline ties FIFO.
    seq: u64,
    task: Task,
}

// ═══════════════════════════════════════════════════════════════
//  Timer queue
// ═══════════════════════════════════════════════════════════════

/// Pending delayed tasks, owned by the drive loop.
#[derive(Debug, Default)]
pub struct TimerQueue {
    entries: Vec<TimerEntry>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
        }
    }

    /// Register `task` to fire `delay_ms` after `now_ms`.
    pub fn schedule(&mut self, task: Task, now_ms: u64, delay_ms: u64) {
        let deadline_ms = now_ms.saturating_add(delay_ms);
        debug!("timer: {task:?} scheduled for t={deadline_ms}ms");
        self.entries.push(TimerEntry {
            deadline_ms,
            seq: self.next_seq,
            task,
        });
        self.next_seq += 1;
    }

    /// Deadline of the entry that will fire next, if any.
    pub fn next_deadline(&self) -> Option<u64> {
        self.entries.iter().map(|e| e.deadline_ms).min()
    }

    /// Remove and return the next entry whose deadline has been reached.
    /// Returns `None` when nothing is due yet (or the queue is empty).
    pub fn pop_due(&mut self, now_ms: u64) -> Option<Task> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .min_by_key(|(_, e)| (e.deadline_ms, e.seq))
            .map(|(i, _)| i)?;
        if self.entries[idx].deadline_ms > now_ms {
            return None;
        }
        Some(self.entries.remove(idx).task)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
