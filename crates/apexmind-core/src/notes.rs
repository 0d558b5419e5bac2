//! Plain notes. Content is stored as-is; formatting is the editor's business.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteStore {
    notes: Vec<Note>,
}

impl From<Vec<Note>> for NoteStore {
    fn from(notes: Vec<Note>) -> Self {
        Self { notes }
    }
}

impl NoteStore {
    pub fn as_slice(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// Append an empty-bodied note.
    pub fn add(
        &mut self,
        id: impl Into<String>,
        title: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<&Note, ValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let index = self.notes.len();
        self.notes.push(Note {
            id: id.into(),
            title,
            content: String::new(),
            created_at: now,
            updated_at: now,
        });
        Ok(&self.notes[index])
    }

    /// Replace title and/or content. Returns false for unknown ids.
    pub fn update(
        &mut self,
        id: &str,
        title: Option<String>,
        content: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<bool, ValidationError> {
        if title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(ValidationError::EmptyTitle);
        }
        let Some(note) = self.notes.iter_mut().find(|n| n.id == id) else {
            debug!(note_id = id, "update for unknown note ignored");
            return Ok(false);
        };
        if let Some(title) = title {
            note.title = title;
        }
        if let Some(content) = content {
            note.content = content;
        }
        note.updated_at = now;
        Ok(true)
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.notes.len();
        self.notes.retain(|n| n.id != id);
        self.notes.len() != before
    }
}
