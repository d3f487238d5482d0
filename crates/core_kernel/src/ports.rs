//! Ports and Adapters Infrastructure
//!
//! The ledger engine never performs I/O itself. It talks to a record store
//! through port traits defined in each domain crate; adapters (a database,
//! the in-memory store used in tests) implement those traits.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │     Application Services     │
//! │ (BillService, BalanceService)│
//! └──────────────────────────────┘
//!                │
//!                ▼
//! ┌──────────────────────────────┐
//! │         Port Traits          │
//! │ (UserStore, BillStore,       │
//! │  SettlementStore, Ledger...) │
//! └──────────────────────────────┘
//!                ▲
//!                │
//!        ┌───────┴────────┐
//!        │    Adapters    │
//!        └────────────────┘
//! ```

use std::fmt;
use thiserror::Error;

/// Error type for port operations
///
/// All store adapters report failures through this type; the engine
/// propagates it unchanged except for `NotFound`, which services translate
/// into their own typed not-found variants.
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested record was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: String,
        id: String,
    },

    /// The write conflicts with existing data (e.g. a unique constraint)
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
    },

    /// An internal adapter error occurred
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if this error indicates the record was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }
}

/// Marker trait for all domain ports
///
/// Ports are shared between services behind `Arc`, so implementations must
/// be thread-safe even though every engine operation is synchronous.
pub trait DomainPort: Send + Sync + 'static {}
