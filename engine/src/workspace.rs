//! Workspace - the aggregate state container.
//!
//! The workspace owns the calculator and every collaborator store. It wires
//! recorded calculations into the persisted history and moves the whole
//! persisted state in and out of a [`Snapshot`].

use crate::event::recorded_calculations;
use crate::storage::{BlobStore, KeyValueStore};
use crate::{
    error::Result, Calculator, Event, HistoryEntry, HistoryLog, IdClock, Input, Note, Notebook,
    OpenedFile, RecordId, Snapshot, Timestamp, Vault, VaultFile, SNAPSHOT_KEY,
};

/// Calculator, notes, history, vault and the id clock they share.
#[derive(Debug, Clone)]
pub struct Workspace {
    calculator: Calculator,
    notes: Notebook,
    history: HistoryLog,
    vault: Vault,
    ids: IdClock,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(Calculator::new(), Vault::new())
    }
}

impl Workspace {
    /// Create an empty workspace around a configured calculator and vault.
    pub fn new(calculator: Calculator, vault: Vault) -> Self {
        Self {
            calculator,
            notes: Notebook::new(),
            history: HistoryLog::new(),
            vault,
            ids: IdClock::new(),
        }
    }

    pub fn calculator(&self) -> &Calculator {
        &self.calculator
    }

    pub fn notes(&self) -> &[Note] {
        self.notes.list()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        self.history.entries()
    }

    pub fn vault(&self) -> &Vault {
        &self.vault
    }

    pub fn vault_mut(&mut self) -> &mut Vault {
        &mut self.vault
    }

    pub fn ids(&self) -> IdClock {
        self.ids
    }

    // ------------------------------------------------------------------
    // Calculator
    // ------------------------------------------------------------------

    /// Apply an input to the calculator. Every recorded calculation is
    /// appended to the persisted history.
    pub fn press(&mut self, input: Input, now: Timestamp) -> Vec<Event> {
        let events = self.calculator.apply(input);
        for line in recorded_calculations(&events) {
            self.history.record(&mut self.ids, line, now);
        }
        events
    }

    /// Load the result of a history entry into the calculator.
    pub fn reuse_history(&mut self, id: RecordId, now: Timestamp) -> Option<Vec<Event>> {
        let calculation = self.history.get(id)?.calculation.clone();
        Some(self.press(Input::ReuseResult { calculation }, now))
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    // ------------------------------------------------------------------
    // Notes
    // ------------------------------------------------------------------

    pub fn add_note(&mut self, title: &str, content: &str, now: Timestamp) -> Result<&Note> {
        self.notes.add(&mut self.ids, title, content, now)
    }

    pub fn edit_note(
        &mut self,
        id: RecordId,
        title: &str,
        content: &str,
        now: Timestamp,
    ) -> Result<&Note> {
        self.notes.edit(id, title, content, now)
    }

    pub fn delete_note(&mut self, id: RecordId) -> Result<Note> {
        self.notes.delete(id)
    }

    pub fn note(&self, id: RecordId) -> Option<&Note> {
        self.notes.get(id)
    }

    // ------------------------------------------------------------------
    // Vault
    // ------------------------------------------------------------------

    pub fn add_vault_file(
        &mut self,
        blobs: &mut dyn BlobStore,
        name: &str,
        mime_type: &str,
        bytes: &[u8],
        now: Timestamp,
    ) -> Result<&VaultFile> {
        self.vault
            .add_file(blobs, &mut self.ids, name, mime_type, bytes, now)
    }

    pub fn open_vault_file(&self, blobs: &dyn BlobStore, id: RecordId) -> Result<OpenedFile> {
        self.vault.open_file(blobs, id)
    }

    pub fn delete_vault_file(
        &mut self,
        blobs: &mut dyn BlobStore,
        id: RecordId,
    ) -> Result<VaultFile> {
        self.vault.delete_file(blobs, id)
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Export everything that persists.
    pub fn export_state(&self) -> Snapshot {
        Snapshot {
            notes: self.notes.list().to_vec(),
            history: self.history.entries().to_vec(),
            vault: self.vault.state().clone(),
            ids: self.ids,
            ..Snapshot::new()
        }
    }

    /// Replace the persisted state with a snapshot.
    ///
    /// The snapshot is validated first; on failure nothing changes. The
    /// vault keeps its gate settings and ends up locked.
    pub fn import_state(&mut self, snapshot: Snapshot) -> Result<()> {
        snapshot.validate()?;

        let vault = Vault::from_state(snapshot.vault)
            .with_max_file_bytes(self.vault.max_file_bytes());
        self.vault = match self.vault.fallback_password() {
            Some(fallback) => vault.with_fallback_password(Some(fallback.to_string())),
            None => vault,
        };
        self.notes = Notebook::from_notes(snapshot.notes);
        self.history = HistoryLog::from_entries(snapshot.history);
        self.ids = snapshot.ids;
        Ok(())
    }

    /// Write the snapshot to `store` under [`SNAPSHOT_KEY`].
    pub fn save<S: KeyValueStore>(&self, store: &mut S) -> Result<()> {
        store.put(SNAPSHOT_KEY, &self.export_state())
    }

    /// Load the snapshot from `store`. Returns `false` if none was stored.
    pub fn load<S: KeyValueStore>(&mut self, store: &S) -> Result<bool> {
        match store.get_raw(SNAPSHOT_KEY)? {
            Some(json) => {
                self.import_state(Snapshot::from_json(&json)?)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
