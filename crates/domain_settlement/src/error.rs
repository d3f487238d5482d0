//! Settlement domain errors

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::{PortError, UserId};

/// Errors surfaced by the settlement domain
#[derive(Debug, Error)]
pub enum SettlementError {
    /// A balance must run between two different users and be positive
    #[error("Invalid balance {debtor_id} -> {creditor_id} of {amount}")]
    InvalidBalance {
        debtor_id: UserId,
        creditor_id: UserId,
        amount: Decimal,
    },

    /// Referenced user does not exist
    #[error("User not found: {user_id}")]
    UserNotFound { user_id: UserId },

    /// Store failure, propagated unchanged
    #[error(transparent)]
    Store(#[from] PortError),
}

impl SettlementError {
    /// Maps a store NotFound for a user lookup into the typed variant
    pub fn from_user_lookup(user_id: UserId, err: PortError) -> Self {
        if err.is_not_found() {
            SettlementError::UserNotFound { user_id }
        } else {
            SettlementError::Store(err)
        }
    }
}
