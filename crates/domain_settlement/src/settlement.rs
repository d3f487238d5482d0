//! Settlement records

use serde::{Deserialize, Serialize};

use core_kernel::{SettlementId, Timestamp};

/// A marker that closes every debt recorded before `settled_at`
///
/// Settlements are append-only. The latest one defines the start of the
/// current epoch; bills created at or before it no longer count towards
/// balances but stay in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: SettlementId,
    pub settled_at: Timestamp,
    pub note: String,
}

impl Settlement {
    /// Returns a copy with a different note
    pub fn with_note(&self, note: impl Into<String>) -> Self {
        Self {
            note: note.into(),
            ..self.clone()
        }
    }
}
