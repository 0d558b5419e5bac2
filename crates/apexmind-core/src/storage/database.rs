//! SQLite-backed state storage.
//!
//! The state lives in a single key-value table, one JSON document per
//! domain:
//! - `tasks`: the task list with ledgers
//! - `timer`: the timer engine
//! - `notes`: notes
//! - `theme`: the dark-mode flag
//!
//! Saves write all documents in one transaction.

use std::path::Path;

use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{PersistedState, StateStore};
use crate::error::StorageError;

const TASKS_KEY: &str = "tasks";
const TIMER_KEY: &str = "timer";
const NOTES_KEY: &str = "notes";
const THEME_KEY: &str = "theme";

/// SQLite database for application state.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database file at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn get_doc<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.kv_get(key)? {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|source| StorageError::Corrupt {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    fn set_doc<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value).map_err(|source| StorageError::Corrupt {
            key: key.to_string(),
            source,
        })?;
        self.kv_set(key, &json)?;
        Ok(())
    }
}

impl StateStore for Database {
    fn load(&self) -> Result<Option<PersistedState>, StorageError> {
        let tasks = self.get_doc(TASKS_KEY)?;
        let timer = self.get_doc(TIMER_KEY)?;
        let notes = self.get_doc(NOTES_KEY)?;
        let dark_mode = self.get_doc(THEME_KEY)?;
        if tasks.is_none() && timer.is_none() && notes.is_none() && dark_mode.is_none() {
            return Ok(None);
        }
        let defaults = PersistedState::default();
        Ok(Some(PersistedState {
            tasks: tasks.unwrap_or(defaults.tasks),
            timer: timer.unwrap_or(defaults.timer),
            notes: notes.unwrap_or(defaults.notes),
            dark_mode: dark_mode.unwrap_or(defaults.dark_mode),
        }))
    }

    fn save(&self, state: &PersistedState) -> Result<(), StorageError> {
        let tx = self.conn.unchecked_transaction()?;
        self.set_doc(TASKS_KEY, &state.tasks)?;
        self.set_doc(TIMER_KEY, &state.timer)?;
        self.set_doc(NOTES_KEY, &state.notes)?;
        self.set_doc(THEME_KEY, &state.dark_mode)?;
        tx.commit()?;
        Ok(())
    }
}
