//! Record types persisted by the collaborator stores.

use crate::{RecordId, Timestamp};
use serde::{Deserialize, Serialize};

/// A user note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: RecordId,
    pub title: String,
    pub content: String,
    /// When the note was first saved (milliseconds since epoch)
    pub created_at: Timestamp,
    /// When the note was last edited (milliseconds since epoch)
    pub updated_at: Timestamp,
}

impl Note {
    /// Create a note; both timestamps start at `now`.
    pub fn new(
        id: RecordId,
        title: impl Into<String>,
        content: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace title and content, keeping the creation time.
    pub fn revise(&mut self, title: String, content: String, now: Timestamp) {
        self.title = title;
        self.content = content;
        self.updated_at = now;
    }

    /// Whether the note has been edited since it was created.
    pub fn is_edited(&self) -> bool {
        self.updated_at != self.created_at
    }
}

/// One recorded calculation line, e.g. `"3 + 4 = 7"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: RecordId,
    pub calculation: String,
    pub timestamp: Timestamp,
}

impl HistoryEntry {
    pub fn new(id: RecordId, calculation: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            id,
            calculation: calculation.into(),
            timestamp,
        }
    }
}

/// The result part of a calculation line: the text after `" = "`.
pub fn calculation_result(line: &str) -> Option<&str> {
    line.split(" = ").nth(1).filter(|r| !r.is_empty())
}

/// Metadata of a file kept in the vault. The bytes live in a blob store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultFile {
    pub id: RecordId,
    pub name: String,
    pub mime_type: String,
    /// Size in bytes
    pub size: u64,
    pub upload_date: Timestamp,
}

/// A vault file with its payload materialised as a `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenedFile {
    #[serde(flatten)]
    pub file: VaultFile,
    pub payload: String,
}
