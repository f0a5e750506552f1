//! Snapshot types for persisting and restoring workspace state.
//!
//! A snapshot carries everything a workspace persists: notes, history,
//! vault metadata and the id clock. The calculator itself is process-local
//! and never persisted. Vault file bytes live in the blob store.

use crate::{error::Result, Error, HistoryEntry, IdClock, Note, RecordId, VaultState};
use crate::history::HISTORY_CAPACITY;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Version of the snapshot format for future compatibility.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Key under which a workspace snapshot is stored.
pub const SNAPSHOT_KEY: &str = "calcvault_state";

/// A point-in-time snapshot of a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Snapshot format version
    pub format_version: u32,
    /// Newest first
    pub notes: Vec<Note>,
    /// Most recent first
    pub history: Vec<HistoryEntry>,
    pub vault: VaultState,
    pub ids: IdClock,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl Snapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            notes: Vec::new(),
            history: Vec::new(),
            vault: VaultState::default(),
            ids: IdClock::new(),
        }
    }

    /// Count records of every kind.
    pub fn record_count(&self) -> usize {
        self.notes.len() + self.history.len() + self.vault.files.len()
    }

    /// The largest record id in the snapshot.
    pub fn max_record_id(&self) -> Option<RecordId> {
        self.record_ids().max()
    }

    /// Check structural invariants: unique ids per collection, bounded
    /// history, and an id clock that is ahead of every record and not yet
    /// exhausted.
    pub fn validate(&self) -> Result<()> {
        check_unique("notes", self.notes.iter().map(|n| n.id))?;
        check_unique("history", self.history.iter().map(|e| e.id))?;
        check_unique("vault files", self.vault.files.iter().map(|f| f.id))?;

        if self.history.len() > HISTORY_CAPACITY {
            return Err(Error::InvalidSnapshot(format!(
                "history holds {} entries (max {})",
                self.history.len(),
                HISTORY_CAPACITY
            )));
        }

        if self.ids.is_exhausted() {
            return Err(Error::InvalidSnapshot(format!(
                "id clock at {} cannot issue further ids",
                self.ids.last()
            )));
        }

        if let Some(max) = self.max_record_id() {
            if max > self.ids.last() {
                return Err(Error::InvalidSnapshot(format!(
                    "id clock at {} is behind record {}",
                    self.ids.last(),
                    max
                )));
            }
        }

        Ok(())
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| Error::InvalidSnapshot(e.to_string()))?;

        if snapshot.format_version > SNAPSHOT_FORMAT_VERSION {
            return Err(Error::InvalidSnapshot(format!(
                "unsupported snapshot format version: {} (max supported: {})",
                snapshot.format_version, SNAPSHOT_FORMAT_VERSION
            )));
        }

        Ok(snapshot)
    }

    fn record_ids(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.notes
            .iter()
            .map(|n| n.id)
            .chain(self.history.iter().map(|e| e.id))
            .chain(self.vault.files.iter().map(|f| f.id))
    }
}

fn check_unique(collection: &str, ids: impl Iterator<Item = RecordId>) -> Result<()> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(Error::InvalidSnapshot(format!(
                "duplicate id {} in {}",
                id, collection
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VaultFile;

    fn populated() -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.notes.push(Note::new(3, "t", "c", 3));
        snapshot.history.push(HistoryEntry::new(2, "1 + 1 = 2", 2));
        snapshot.vault.password = Some("pw".into());
        snapshot.vault.files.push(VaultFile {
            id: 1,
            name: "a.txt".into(),
            mime_type: "text/plain".into(),
            size: 2,
            upload_date: 1,
        });
        snapshot.ids = IdClock::starting_after(3);
        snapshot
    }

    #[test]
    fn create_empty_snapshot() {
        let snapshot = Snapshot::new();
        assert_eq!(snapshot.format_version, SNAPSHOT_FORMAT_VERSION);
        assert_eq!(snapshot.record_count(), 0);
        assert_eq!(snapshot.max_record_id(), None);
        assert!(snapshot.validate().is_ok());
    }

    #[test]
    fn json_roundtrip() {
        let snapshot = populated();
        let json = snapshot.to_json().unwrap();
        let restored = Snapshot::from_json(&json).unwrap();
        assert_eq!(snapshot, restored);
        assert_eq!(restored.record_count(), 3);
    }

    #[test]
    fn serialization_format() {
        let json = populated().to_json().unwrap();
        assert!(json.contains("\"formatVersion\":1"));
        assert!(json.contains("\"mimeType\""));
        assert!(json.contains("\"ids\":{\"last\":3}"));
    }

    #[test]
    fn reject_future_format_version() {
        let json = r#"{
            "formatVersion": 999,
            "notes": [],
            "history": [],
            "vault": {"password": null, "files": []},
            "ids": {"last": 0}
        }"#;

        let result = Snapshot::from_json(json);
        assert!(matches!(result, Err(Error::InvalidSnapshot(_))));
    }

    #[test]
    fn reject_malformed_json() {
        assert!(matches!(
            Snapshot::from_json("{\"formatVersion\": 1"),
            Err(Error::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn validate_duplicate_ids() {
        let mut snapshot = populated();
        snapshot.notes.push(Note::new(3, "again", "c", 3));
        assert!(matches!(
            snapshot.validate(),
            Err(Error::InvalidSnapshot(msg)) if msg.contains("duplicate id 3")
        ));
    }

    #[test]
    fn validate_history_capacity() {
        let mut snapshot = Snapshot::new();
        snapshot.history = (1..=51).map(|i| HistoryEntry::new(i, "x = 1", i)).collect();
        snapshot.ids = IdClock::starting_after(51);
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn validate_clock_behind_records() {
        let mut snapshot = populated();
        snapshot.ids = IdClock::starting_after(1);
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn validate_exhausted_clock() {
        let json = r#"{
            "formatVersion": 1,
            "notes": [],
            "history": [],
            "vault": {"password": null, "files": []},
            "ids": {"last": 18446744073709551615}
        }"#;
        let snapshot = Snapshot::from_json(json).unwrap();
        assert!(matches!(
            snapshot.validate(),
            Err(Error::InvalidSnapshot(msg)) if msg.contains("cannot issue")
        ));
    }
}
