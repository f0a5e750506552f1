//! The persisted calculation history.

use crate::{HistoryEntry, IdClock, RecordId, Timestamp};
use serde::{Deserialize, Serialize};

/// Maximum number of persisted history entries.
pub const HISTORY_CAPACITY: usize = 50;

/// Calculation lines, most recent first, bounded to [`HISTORY_CAPACITY`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted entries, dropping any beyond capacity.
    pub fn from_entries(mut entries: Vec<HistoryEntry>) -> Self {
        entries.truncate(HISTORY_CAPACITY);
        Self { entries }
    }

    /// Record a calculation line at the front.
    pub fn record(&mut self, ids: &mut IdClock, calculation: &str, now: Timestamp) -> &HistoryEntry {
        let entry = HistoryEntry::new(ids.next(now), calculation, now);
        self.entries.insert(0, entry);
        self.entries.truncate(HISTORY_CAPACITY);
        &self.entries[0]
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// All entries, most recent first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, id: RecordId) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
