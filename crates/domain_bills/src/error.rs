//! Bills domain errors
//!
//! Every rejection carries the offending value and the bound it violated so
//! callers can render their own messages.

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::{BillId, PortError, UserId};

/// Which free-text field a length rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    UserName,
    BillDescription,
    ItemDescription,
}

impl std::fmt::Display for TextField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TextField::UserName => "user name",
            TextField::BillDescription => "bill description",
            TextField::ItemDescription => "item description",
        };
        f.write_str(name)
    }
}

/// Malformed user or bill input, detected before any write
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} cannot be empty")]
    EmptyText { field: TextField },

    #[error("{field} is {len} characters, maximum is {max}")]
    TextTooLong { field: TextField, len: usize, max: usize },

    #[error("User name {name:?} is already taken")]
    DuplicateUserName { name: String },

    #[error("Bill must have at least one item")]
    NoItems,

    #[error("Tax must be non-negative, got {tax}")]
    NegativeTax { tax: Decimal },

    #[error("Tax {tax} exceeds the maximum of {max}")]
    TaxTooLarge { tax: Decimal, max: Decimal },

    #[error("Item {item_index} cost must be positive, got {cost}")]
    NonPositiveCost { item_index: usize, cost: Decimal },

    #[error("Item {item_index} cost {cost} exceeds the maximum of {max}")]
    CostTooLarge {
        item_index: usize,
        cost: Decimal,
        max: Decimal,
    },

    #[error("Item {item_index} must have at least one assignment")]
    NoAssignments { item_index: usize },

    #[error("Item {item_index}: fraction {fraction} for {user_id} is outside (0, 1]")]
    FractionOutOfRange {
        item_index: usize,
        user_id: UserId,
        fraction: Decimal,
    },

    #[error("Item {item_index}: {user_id} is assigned more than once")]
    DuplicateAssignment { item_index: usize, user_id: UserId },

    #[error("Item {item_index} fractions sum to {total}, must equal 1 within {tolerance}")]
    FractionSumMismatch {
        item_index: usize,
        total: Decimal,
        tolerance: Decimal,
    },
}

/// Errors surfaced by the bills domain services
#[derive(Debug, Error)]
pub enum BillError {
    /// Referenced user does not exist
    #[error("User not found: {user_id}")]
    UserNotFound { user_id: UserId },

    /// Referenced bill does not exist
    #[error("Bill not found: {bill_id}")]
    BillNotFound { bill_id: BillId },

    /// Input failed validation; nothing was written
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The user is a debtor or creditor in the current epoch
    #[error("{user_id} has outstanding balances; settle before deleting")]
    OutstandingBalances { user_id: UserId },

    /// Store failure, propagated unchanged
    #[error(transparent)]
    Store(#[from] PortError),
}

impl BillError {
    /// Maps a store NotFound for a user lookup into the typed variant
    pub fn from_user_lookup(user_id: UserId, err: PortError) -> Self {
        if err.is_not_found() {
            BillError::UserNotFound { user_id }
        } else {
            BillError::Store(err)
        }
    }

    /// Maps a store NotFound for a bill lookup into the typed variant
    pub fn from_bill_lookup(bill_id: BillId, err: PortError) -> Self {
        if err.is_not_found() {
            BillError::BillNotFound { bill_id }
        } else {
            BillError::Store(err)
        }
    }

    /// Returns true for the not-found kinds
    pub fn is_not_found(&self) -> bool {
        matches!(self, BillError::UserNotFound { .. } | BillError::BillNotFound { .. })
    }
}
