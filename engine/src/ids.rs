//! Id clock for record identifiers.
//!
//! Ids follow wall-clock milliseconds but never repeat: every issued id is
//! strictly greater than the previous one, even when several records are
//! created within the same millisecond or the wall clock steps backwards.

use crate::{RecordId, Timestamp};
use serde::{Deserialize, Serialize};

/// Issues monotonically increasing record ids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdClock {
    /// The last id handed out (0 before the first)
    last: RecordId,
}

impl IdClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume issuing after `last`.
    pub fn starting_after(last: RecordId) -> Self {
        Self { last }
    }

    /// Issue the next id: `max(now, last + 1)`.
    ///
    /// Saturates at `u64::MAX`; snapshots with an exhausted clock are
    /// rejected on import, see [`IdClock::is_exhausted`].
    pub fn next(&mut self, now: Timestamp) -> RecordId {
        self.last = now.max(self.last.saturating_add(1));
        self.last
    }

    /// Whether no further unique id can be issued.
    pub fn is_exhausted(&self) -> bool {
        self.last == RecordId::MAX
    }

    /// The last id handed out.
    pub fn last(&self) -> RecordId {
        self.last
    }
}
