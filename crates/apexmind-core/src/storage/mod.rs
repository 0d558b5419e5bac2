//! Persistence collaborator and configuration.
//!
//! The application context loads a [`PersistedState`] once at startup and
//! saves it after every mutating operation through a [`StateStore`].

mod config;
pub mod database;

pub use config::{Config, TasksConfig, TimerConfig, UiConfig};
pub use database::Database;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::notes::NoteStore;
use crate::task::TaskStore;
use crate::timer::TimerEngine;

/// Everything that survives a restart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub tasks: TaskStore,
    #[serde(default)]
    pub timer: TimerEngine,
    #[serde(default)]
    pub notes: NoteStore,
    #[serde(default)]
    pub dark_mode: bool,
}

/// Load/save of the whole application state.
pub trait StateStore: Send {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<PersistedState>, StorageError>;

    fn save(&self, state: &PersistedState) -> Result<(), StorageError>;
}

/// In-process store. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<PersistedState>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last saved state, if any.
    pub fn saved(&self) -> Option<PersistedState> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<PersistedState>, StorageError> {
        Ok(self.saved())
    }

    fn save(&self, state: &PersistedState) -> Result<(), StorageError> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(state.clone());
        Ok(())
    }
}

/// Returns the data directory, creating it if needed.
///
/// `APEXMIND_DATA_DIR` overrides the location outright. Otherwise it is
/// `~/.config/apexmind/`, or `~/.config/apexmind-dev/` when
/// `APEXMIND_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("APEXMIND_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("APEXMIND_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("apexmind-dev")
            } else {
                base_dir.join("apexmind")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
