use serde::{Deserialize, Serialize};

use super::engine::TimerState;

/// Live timer readout derived from the engine and one `now` sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerDisplay {
    pub state: TimerState,
    pub task_id: Option<String>,
    pub elapsed_secs: u64,
    /// `None` in infinite mode.
    pub remaining_secs: Option<u64>,
    pub is_infinite: bool,
}

impl TimerDisplay {
    /// Seconds shown on the clock face: remaining time when counting down,
    /// elapsed time in infinite mode. `None` for an idle infinite timer.
    pub fn face_secs(&self) -> Option<u64> {
        match self.remaining_secs {
            Some(remaining) => Some(remaining),
            None if self.state == TimerState::Running => Some(self.elapsed_secs),
            None => None,
        }
    }

    pub fn face(&self) -> String {
        self.face_secs()
            .map(format_clock)
            .unwrap_or_else(|| "--:--".to_string())
    }
}

/// `mm:ss`, or `h:mm:ss` from one hour up.
pub fn format_clock(seconds: u64) -> String {
    let hrs = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hrs > 0 {
        format!("{hrs}:{mins:02}:{secs:02}")
    } else {
        format!("{mins:02}:{secs:02}")
    }
}
