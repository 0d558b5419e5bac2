//! # ApexMind Core Library
//!
//! This library provides the time-tracking core of the ApexMind productivity
//! tool: tasks with a per-day time ledger, a wall-clock focus timer that
//! feeds that ledger, and the calendar and analytics projections built on
//! top. The `apexmind` CLI is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-based state machine that requires the caller
//!   to periodically invoke `tick()`; a [`TickScheduler`] drives it on tokio
//! - **Task Store**: Task lifecycle, subtasks and the [`DailyLedger`] of
//!   tracked seconds per local calendar day
//! - **Storage**: SQLite key-value persistence and TOML-based configuration
//! - **App**: The [`App`] context that owns all state, samples the [`Clock`],
//!   and saves after every change
//!
//! ## Key Components
//!
//! - [`App`]: Application context and the operations the UI calls
//! - [`TimerEngine`]: Core timer state machine
//! - [`TaskStore`]: Ordered task collection
//! - [`Database`]: Persistence of the whole application state
//! - [`Config`]: Application configuration management

pub mod app;
pub mod calendar;
pub mod clock;
pub mod error;
pub mod events;
pub mod notes;
pub mod stats;
pub mod storage;
pub mod task;
pub mod timer;

pub use app::{App, AppSettings, TickReport};
pub use clock::{local_day, Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use notes::{Note, NoteStore};
pub use storage::{Config, Database, MemoryStore, PersistedState, StateStore};
pub use task::{
    DailyLedger, DayWatch, ExpiryPolicy, NewTask, Priority, SubTask, Task, TaskPatch, TaskStatus,
    TaskStore,
};
pub use timer::{TickControl, TickHandle, TickScheduler, TimerDisplay, TimerEngine, TimerState};
