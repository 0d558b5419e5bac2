mod display;
mod engine;
mod scheduler;

pub use display::{format_clock, TimerDisplay};
pub use engine::{
    normalize_minutes, Flush, Stopped, TickOutcome, TimerEngine, TimerState,
    DEFAULT_DURATION_SECS,
};
pub use scheduler::{TickControl, TickHandle, TickScheduler};
