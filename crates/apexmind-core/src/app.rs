//! Application context.
//!
//! [`App`] is the single owner of the task store, timer, notes and theme
//! flag. Every mutating operation samples the clock once, applies its
//! transition, and saves the whole state through the [`StateStore`].
//!
//! If a save or the initial load fails the app keeps running in memory only
//! for the rest of the session; see [`App::is_degraded`].

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clock::{local_day, whole_seconds_between, Clock};
use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::notes::{Note, NoteStore};
use crate::storage::{data_dir, Config, Database, PersistedState, StateStore};
use crate::task::{DayWatch, ExpiryPolicy, NewTask, Task, TaskPatch, TaskStatus, TaskStore};
use crate::timer::{Flush, TimerDisplay, TimerEngine, TimerState, DEFAULT_DURATION_SECS};

/// Runtime knobs, usually derived from `Config::settings()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Countdown length for a timer that has never been configured
    pub default_duration_secs: u64,
    /// Minimum seconds between ledger flushes while running
    pub flush_interval_secs: u64,
    pub expiry_policy: ExpiryPolicy,
    /// Theme for a fresh install
    pub dark_mode: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_duration_secs: DEFAULT_DURATION_SECS,
            flush_interval_secs: 60,
            expiry_policy: ExpiryPolicy::default(),
            dark_mode: true,
        }
    }
}

/// What one tick did.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub display: TimerDisplay,
    pub events: Vec<Event>,
}

impl TickReport {
    /// True while the timer is still running after this tick.
    pub fn running(&self) -> bool {
        self.display.state == TimerState::Running
    }
}

pub struct App {
    tasks: TaskStore,
    timer: TimerEngine,
    notes: NoteStore,
    dark_mode: bool,
    store: Box<dyn StateStore>,
    clock: Arc<dyn Clock>,
    settings: AppSettings,
    day: DayWatch,
    degraded: bool,
}

impl App {
    /// Rehydrate from `store`.
    ///
    /// A load failure starts a fresh in-memory session. A timer that was
    /// running when last saved keeps running from its stored start time.
    /// Completed tasks past their day are swept immediately.
    pub fn load(store: Box<dyn StateStore>, clock: Arc<dyn Clock>, settings: AppSettings) -> Self {
        let (state, degraded) = match store.load() {
            Ok(Some(state)) => (state, false),
            Ok(None) => (fresh_state(&settings), false),
            Err(e) => {
                warn!(error = %e, "failed to load saved state; continuing in memory only");
                (fresh_state(&settings), true)
            }
        };
        let today = clock.today();
        let mut timer = state.timer;
        timer.reconcile_loaded();

        let mut app = Self {
            tasks: state.tasks,
            timer,
            notes: state.notes,
            dark_mode: state.dark_mode,
            store,
            clock,
            settings,
            day: DayWatch::new(today),
            degraded,
        };
        if app.timer.is_running() {
            info!(task_id = ?app.timer.task_id(), "resuming running timer");
        }
        let now = app.clock.now();
        if app.sweep_expired(now).is_some() {
            app.persist();
        }
        app
    }

    /// Open the database and config file in the data directory.
    ///
    /// # Errors
    /// Returns an error if the data directory, config file or database
    /// cannot be opened. A missing config file is created with defaults.
    pub fn open(clock: Arc<dyn Clock>) -> Result<(Self, Config)> {
        Self::open_in(&data_dir()?, clock)
    }

    /// Open `apexmind.db` and `config.toml` under `dir`.
    pub fn open_in(dir: &Path, clock: Arc<dyn Clock>) -> Result<(Self, Config)> {
        let config = Config::load_from(&dir.join("config.toml"))?;
        let db = Database::open_at(dir.join("apexmind.db"))?;
        let app = Self::load(Box::new(db), clock, config.settings());
        Ok((app, config))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn tasks(&self) -> &[Task] {
        self.tasks.as_slice()
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn timer(&self) -> &TimerEngine {
        &self.timer
    }

    pub fn notes(&self) -> &[Note] {
        self.notes.as_slice()
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// True once persistence has failed; state then lives in memory only.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Seconds tracked on a task today, including the part of the running
    /// interval not yet flushed.
    pub fn live_time_tracked(&self, task_id: &str) -> u64 {
        let now = self.clock.now();
        let flushed = self
            .tasks
            .get(task_id)
            .map(|t| t.time_tracked(local_day(now)))
            .unwrap_or(0);
        let pending = match (self.timer.task_id(), self.timer.last_flush()) {
            (Some(active), Some(last)) if active == task_id && self.timer.is_running() => {
                whole_seconds_between(last, now)
            }
            _ => 0,
        };
        flushed + pending
    }

    pub fn timer_display(&self) -> TimerDisplay {
        self.timer.display(self.clock.now())
    }

    pub fn snapshot(&self) -> PersistedState {
        PersistedState {
            tasks: self.tasks.clone(),
            timer: self.timer.clone(),
            notes: self.notes.clone(),
            dark_mode: self.dark_mode,
        }
    }

    // ── Timer ────────────────────────────────────────────────────────

    pub fn start_timer(&mut self, task_id: Option<String>) -> Option<Event> {
        let now = self.clock.now();
        let event = self.timer.start(task_id, now)?;
        info!(task_id = ?self.timer.task_id(), "timer started");
        self.persist();
        Some(event)
    }

    /// Stop the timer, crediting the unflushed tail to the bound task.
    pub fn stop_timer(&mut self) -> Vec<Event> {
        let now = self.clock.now();
        let Some(stopped) = self.timer.stop(now) else {
            return Vec::new();
        };
        let mut events = Vec::new();
        if let Some(flush) = stopped.flush {
            events.extend(self.apply_flush(flush, now));
        }
        info!(time_elapsed_secs = self.timer.time_elapsed_secs(), "timer stopped");
        events.push(stopped.event);
        self.persist();
        events
    }

    /// Reset the timer session. Ledger time already flushed stays put.
    pub fn reset_timer(&mut self) -> Event {
        let event = self.timer.reset(self.clock.now());
        self.persist();
        event
    }

    pub fn set_timer_duration(&mut self, seconds: u64) {
        self.timer.set_duration(seconds);
        self.persist();
    }

    pub fn set_infinite_mode(&mut self, infinite: bool) {
        self.timer.set_infinite_mode(infinite);
        self.persist();
    }

    /// One reconciliation step.
    ///
    /// Observes the calendar day (rollover and expiry sweep), then advances
    /// the timer with the same `now` sample and credits any due flush.
    /// Saves only when something changed.
    pub fn tick(&mut self) -> TickReport {
        let now = self.clock.now();
        let mut events = self.observe_day_at(now);
        let mut dirty = !events.is_empty();

        let outcome = self.timer.tick(now, self.settings.flush_interval_secs);
        if let Some(flush) = outcome.flush {
            events.extend(self.apply_flush(flush, now));
            dirty = true;
        }
        if let Some(completed) = outcome.completed {
            info!(time_elapsed_secs = self.timer.time_elapsed_secs(), "countdown finished");
            events.push(completed);
            dirty = true;
        }
        if dirty {
            self.persist();
        }
        TickReport {
            display: outcome.display,
            events,
        }
    }

    // ── Day boundaries ───────────────────────────────────────────────

    /// Check for a calendar-day change; on change, run the expiry sweep.
    pub fn observe_day(&mut self) -> Vec<Event> {
        let now = self.clock.now();
        let events = self.observe_day_at(now);
        if !events.is_empty() {
            self.persist();
        }
        events
    }

    fn observe_day_at(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let today = local_day(now);
        let Some(previous) = self.day.observe(today) else {
            return Vec::new();
        };
        info!(from = %previous, to = %today, "day rolled over");
        let mut events = vec![Event::DayRolledOver {
            from: previous,
            to: today,
        }];
        events.extend(self.sweep_expired(now));
        events
    }

    fn sweep_expired(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let removed = self
            .tasks
            .sweep_expired(self.settings.expiry_policy, local_day(now));
        if removed.is_empty() {
            return None;
        }
        info!(count = removed.len(), "expired completed tasks removed");
        Some(Event::TasksExpired {
            task_ids: removed,
            at: now,
        })
    }

    // ── Tasks ────────────────────────────────────────────────────────

    pub fn add_task(&mut self, id: impl Into<String>, new: NewTask) -> Result<&Task, ValidationError> {
        let now = self.clock.now();
        let id = id.into();
        self.tasks.create(id.clone(), new, now)?;
        self.persist();
        self.tasks.get(&id).ok_or_else(|| ValidationError::InvalidValue {
            field: "id".into(),
            message: format!("task '{id}' missing after insert"),
        })
    }

    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> Result<bool, ValidationError> {
        let now = self.clock.now();
        let updated = self.tasks.update(id, patch, now)?;
        if updated {
            self.persist();
        }
        Ok(updated)
    }

    pub fn delete_task(&mut self, id: &str) -> Option<Task> {
        let removed = self.tasks.delete(id)?;
        self.persist();
        Some(removed)
    }

    /// Change a task's status. `None` if the task doesn't exist.
    pub fn set_task_status(&mut self, id: &str, status: TaskStatus) -> Option<Event> {
        let now = self.clock.now();
        let Some(from) = self.tasks.set_status(id, status, now) else {
            debug!(task_id = id, "status change for unknown task ignored");
            return None;
        };
        self.persist();
        Some(Event::TaskStatusChanged {
            task_id: id.to_string(),
            from,
            to: status,
            at: now,
        })
    }

    pub fn add_subtask(
        &mut self,
        task_id: &str,
        subtask_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Result<bool, ValidationError> {
        let now = self.clock.now();
        let added = self.tasks.add_subtask(task_id, subtask_id, title, now)?;
        if added {
            self.persist();
        }
        Ok(added)
    }

    pub fn toggle_subtask(&mut self, task_id: &str, subtask_id: &str) -> bool {
        let now = self.clock.now();
        let toggled = self.tasks.toggle_subtask(task_id, subtask_id, now);
        if toggled {
            self.persist();
        }
        toggled
    }

    /// Credit `seconds` to today's bucket of a task. Unknown ids are ignored.
    pub fn add_time(&mut self, task_id: &str, seconds: u64) -> Option<u64> {
        let now = self.clock.now();
        let total = self.tasks.add_time(task_id, seconds, local_day(now), now)?;
        self.persist();
        Some(total)
    }

    // ── Notes & theme ────────────────────────────────────────────────

    pub fn add_note(&mut self, id: impl Into<String>, title: impl Into<String>) -> Result<&Note, ValidationError> {
        let now = self.clock.now();
        let id = id.into();
        self.notes.add(id.clone(), title, now)?;
        self.persist();
        self.notes.get(&id).ok_or_else(|| ValidationError::InvalidValue {
            field: "id".into(),
            message: format!("note '{id}' missing after insert"),
        })
    }

    pub fn update_note(
        &mut self,
        id: &str,
        title: Option<String>,
        content: Option<String>,
    ) -> Result<bool, ValidationError> {
        let now = self.clock.now();
        let updated = self.notes.update(id, title, content, now)?;
        if updated {
            self.persist();
        }
        Ok(updated)
    }

    pub fn delete_note(&mut self, id: &str) -> bool {
        let deleted = self.notes.delete(id);
        if deleted {
            self.persist();
        }
        deleted
    }

    pub fn set_dark_mode(&mut self, dark: bool) {
        self.dark_mode = dark;
        self.persist();
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn apply_flush(&mut self, flush: Flush, now: DateTime<Utc>) -> Option<Event> {
        let day = local_day(now);
        self.tasks.add_time(&flush.task_id, flush.seconds, day, now)?;
        debug!(task_id = %flush.task_id, seconds = flush.seconds, %day, "time flushed");
        Some(Event::TimeFlushed {
            task_id: flush.task_id,
            seconds: flush.seconds,
            day,
            at: flush.at,
        })
    }

    fn persist(&mut self) {
        if self.degraded {
            return;
        }
        let state = self.snapshot();
        if let Err(e) = self.store.save(&state) {
            warn!(error = %e, "failed to save state; continuing in memory only");
            self.degraded = true;
        }
    }
}

fn fresh_state(settings: &AppSettings) -> PersistedState {
    PersistedState {
        timer: TimerEngine::new(settings.default_duration_secs),
        dark_mode: settings.dark_mode,
        ..PersistedState::default()
    }
}
