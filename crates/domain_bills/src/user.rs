//! Ledger participants

use serde::{Deserialize, Serialize};

use core_kernel::{Timestamp, UserId};

/// A participant who can pay for bills and be assigned items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identifier
    pub id: UserId,
    /// Unique display name
    pub name: String,
    /// When the user was registered
    pub created_at: Timestamp,
}

impl User {
    /// Returns a copy with a new name
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }
}
