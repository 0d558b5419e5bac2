//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine. It does not use
//! internal threads and never samples the clock itself: every command takes
//! `now`, and the caller is responsible for calling `tick()` periodically.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> Running --stop / countdown reaches zero--> Idle
//! ```
//!
//! ## Ledger flushes
//!
//! While running with a bound task, `tick()` hands out the seconds elapsed
//! since the last flush once at least `flush_interval_secs` have
//! accumulated. The flush marker is seeded at start, so the first flush is
//! the true elapsed span. Stopping hands out the remaining tail.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::default();
//! engine.start(Some("task-1".into()), clock.now());
//! // In a loop:
//! let outcome = engine.tick(clock.now(), 60);
//! if let Some(flush) = outcome.flush { /* credit the ledger */ }
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::display::TimerDisplay;
use crate::clock::whole_seconds_between;
use crate::events::Event;

/// 25 minutes.
pub const DEFAULT_DURATION_SECS: u64 = 25 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
}

/// Seconds to credit to a task's ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flush {
    pub task_id: String,
    pub seconds: u64,
    pub at: DateTime<Utc>,
}

/// Result of a `stop()` on a running timer.
#[derive(Debug, Clone, PartialEq)]
pub struct Stopped {
    pub event: Event,
    /// Unflushed tail of the interval, if a task was bound.
    pub flush: Option<Flush>,
}

/// Result of one `tick()`. Display, flush and completion share one `now`.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub display: TimerDisplay,
    pub flush: Option<Flush>,
    /// `Some(Event::TimerCompleted)` when the countdown hit zero on this tick.
    pub completed: Option<Event>,
}

/// Input policy for user-entered durations: at least one minute.
pub fn normalize_minutes(minutes: i64) -> u64 {
    minutes.max(1) as u64
}

/// Core timer engine.
///
/// Operates on wall-clock deltas with no internal thread. The whole struct is
/// the durable timer state; the live countdown is recomputed from
/// `start_time` on every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerEngine {
    state: TimerState,
    /// Start of the current running interval. Present iff running.
    #[serde(default)]
    start_time: Option<DateTime<Utc>>,
    /// Point up to which the current interval has been credited to the ledger.
    #[serde(default)]
    last_flush: Option<DateTime<Utc>>,
    /// Task receiving tracked time. Kept after stop, cleared by reset.
    #[serde(default)]
    task_id: Option<String>,
    /// Countdown length in seconds (ignored in infinite mode).
    duration_secs: u64,
    #[serde(default)]
    is_infinite: bool,
    /// Last chosen countdown length in minutes, restored when leaving
    /// infinite mode.
    custom_duration_min: u64,
    /// Seconds across all stopped intervals since the last reset.
    #[serde(default)]
    time_elapsed_secs: u64,
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION_SECS)
    }
}

impl TimerEngine {
    /// Create an idle engine with the given countdown length.
    pub fn new(duration_secs: u64) -> Self {
        Self {
            state: TimerState::Idle,
            start_time: None,
            last_flush: None,
            task_id: None,
            duration_secs,
            is_infinite: false,
            custom_duration_min: duration_secs / 60,
            time_elapsed_secs: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    pub fn last_flush(&self) -> Option<DateTime<Utc>> {
        self.last_flush
    }

    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn is_infinite(&self) -> bool {
        self.is_infinite
    }

    pub fn custom_duration_min(&self) -> u64 {
        self.custom_duration_min
    }

    pub fn time_elapsed_secs(&self) -> u64 {
        self.time_elapsed_secs
    }

    /// Whole seconds in the current running interval; zero when idle.
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u64 {
        match (self.state, self.start_time) {
            (TimerState::Running, Some(start)) => whole_seconds_between(start, now),
            _ => 0,
        }
    }

    /// Countdown remaining; `None` in infinite mode.
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> Option<u64> {
        if self.is_infinite {
            None
        } else {
            Some(self.duration_secs.saturating_sub(self.elapsed_secs(now)))
        }
    }

    pub fn display(&self, now: DateTime<Utc>) -> TimerDisplay {
        TimerDisplay {
            state: self.state,
            task_id: self.task_id.clone(),
            elapsed_secs: self.elapsed_secs(now),
            remaining_secs: self.remaining_secs(now),
            is_infinite: self.is_infinite,
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self, now: DateTime<Utc>) -> Event {
        Event::StateSnapshot {
            state: self.state,
            task_id: self.task_id.clone(),
            elapsed_secs: self.elapsed_secs(now),
            remaining_secs: self.remaining_secs(now),
            time_elapsed_secs: self.time_elapsed_secs,
            is_infinite: self.is_infinite,
            at: now,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Idle -> Running. The task id is not validated.
    pub fn start(&mut self, task_id: Option<String>, now: DateTime<Utc>) -> Option<Event> {
        if self.is_running() {
            debug!("start ignored: timer already running");
            return None;
        }
        self.state = TimerState::Running;
        self.start_time = Some(now);
        self.last_flush = Some(now);
        self.task_id = task_id;
        Some(Event::TimerStarted {
            task_id: self.task_id.clone(),
            duration_secs: (!self.is_infinite).then_some(self.duration_secs),
            at: now,
        })
    }

    /// Running -> Idle. No-op when idle.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Option<Stopped> {
        if !self.is_running() {
            debug!("stop ignored: timer idle");
            return None;
        }
        let (interval_secs, flush) = self.finish_interval(now);
        Some(Stopped {
            event: Event::TimerStopped {
                task_id: self.task_id.clone(),
                interval_secs,
                time_elapsed_secs: self.time_elapsed_secs,
                at: now,
            },
            flush,
        })
    }

    /// Back to a fresh idle session. Already-flushed ledger time is untouched.
    pub fn reset(&mut self, now: DateTime<Utc>) -> Event {
        self.state = TimerState::Idle;
        self.start_time = None;
        self.last_flush = None;
        self.task_id = None;
        self.time_elapsed_secs = 0;
        Event::TimerReset { at: now }
    }

    /// Set the countdown length; `custom_duration_min` follows it.
    pub fn set_duration(&mut self, seconds: u64) {
        self.duration_secs = seconds;
        self.custom_duration_min = seconds / 60;
    }

    /// Leaving infinite mode restores the countdown from
    /// `custom_duration_min`.
    pub fn set_infinite_mode(&mut self, infinite: bool) {
        self.is_infinite = infinite;
        if !infinite {
            self.duration_secs = self.custom_duration_min.saturating_mul(60);
        }
    }

    /// Call periodically while running.
    ///
    /// Returns the display for `now`, a ledger flush when one is due, and a
    /// completion event when the countdown reaches zero (the timer is then
    /// idle and further ticks do nothing).
    pub fn tick(&mut self, now: DateTime<Utc>, flush_interval_secs: u64) -> TickOutcome {
        let mut display = self.display(now);
        if !self.is_running() {
            return TickOutcome {
                display,
                flush: None,
                completed: None,
            };
        }

        if display.remaining_secs == Some(0) {
            let (interval_secs, flush) = self.finish_interval(now);
            display.state = self.state;
            return TickOutcome {
                display,
                flush,
                completed: Some(Event::TimerCompleted {
                    task_id: self.task_id.clone(),
                    interval_secs,
                    time_elapsed_secs: self.time_elapsed_secs,
                    at: now,
                }),
            };
        }

        let due = self
            .last_flush
            .is_some_and(|last| whole_seconds_between(last, now) >= flush_interval_secs);
        let flush = if due { self.take_unflushed(now) } else { None };
        TickOutcome {
            display,
            flush,
            completed: None,
        }
    }

    /// Make a deserialized engine internally consistent.
    ///
    /// A running timer without a start time is treated as idle; a running
    /// timer without a flush marker resumes flushing from its start.
    pub fn reconcile_loaded(&mut self) {
        match (self.state, self.start_time) {
            (TimerState::Running, None) => {
                self.state = TimerState::Idle;
                self.last_flush = None;
            }
            (TimerState::Running, Some(start)) => {
                if self.last_flush.is_none() {
                    self.last_flush = Some(start);
                }
            }
            (TimerState::Idle, _) => {
                self.start_time = None;
                self.last_flush = None;
            }
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Shared stop effect: accumulate the interval, hand out the unflushed
    /// tail, go idle. `task_id` is retained.
    fn finish_interval(&mut self, now: DateTime<Utc>) -> (u64, Option<Flush>) {
        let interval = self.elapsed_secs(now);
        let flush = self.take_unflushed(now);
        self.time_elapsed_secs = self.time_elapsed_secs.saturating_add(interval);
        self.state = TimerState::Idle;
        self.start_time = None;
        self.last_flush = None;
        (interval, flush)
    }

    /// Whole seconds since the flush marker, for the bound task.
    ///
    /// The marker advances by exactly the seconds handed out so sub-second
    /// remainders carry into the next flush.
    fn take_unflushed(&mut self, now: DateTime<Utc>) -> Option<Flush> {
        let last = self.last_flush?;
        let task_id = self.task_id.clone()?;
        let seconds = whole_seconds_between(last, now);
        if seconds == 0 {
            return None;
        }
        self.last_flush = Some(last + Duration::seconds(seconds as i64));
        Some(Flush {
            task_id,
            seconds,
            at: now,
        })
    }
}
