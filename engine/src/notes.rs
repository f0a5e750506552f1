//! The notebook: user notes, newest first.

use crate::{error::Result, Error, IdClock, Note, RecordId, Timestamp};
use serde::{Deserialize, Serialize};

/// Notes kept most recent first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Notebook {
    notes: Vec<Note>,
}

impl Notebook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted notes (already newest first).
    pub fn from_notes(notes: Vec<Note>) -> Self {
        Self { notes }
    }

    /// Add a note at the front. Title and content are trimmed and must both
    /// be non-empty.
    pub fn add(
        &mut self,
        ids: &mut IdClock,
        title: &str,
        content: &str,
        now: Timestamp,
    ) -> Result<&Note> {
        let (title, content) = validate(title, content)?;
        let note = Note::new(ids.next(now), title, content, now);
        self.notes.insert(0, note);
        Ok(&self.notes[0])
    }

    /// Replace a note's title and content.
    pub fn edit(
        &mut self,
        id: RecordId,
        title: &str,
        content: &str,
        now: Timestamp,
    ) -> Result<&Note> {
        let (title, content) = validate(title, content)?;
        let note = self
            .notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(Error::RecordNotFound(id))?;
        note.revise(title, content, now);
        Ok(note)
    }

    /// Remove a note, returning it.
    pub fn delete(&mut self, id: RecordId) -> Result<Note> {
        let index = self
            .notes
            .iter()
            .position(|n| n.id == id)
            .ok_or(Error::RecordNotFound(id))?;
        Ok(self.notes.remove(index))
    }

    pub fn get(&self, id: RecordId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// All notes, newest first.
    pub fn list(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

fn validate(title: &str, content: &str) -> Result<(String, String)> {
    let title = title.trim();
    let content = content.trim();
    if title.is_empty() || content.is_empty() {
        return Err(Error::EmptyField("title and content"));
    }
    Ok((title.to_string(), content.to_string()))
}
