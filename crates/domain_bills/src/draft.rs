//! Bill creation input
//!
//! A draft is what a caller hands to `BillService::create_bill`. It carries no
//! identifiers or timestamps; the store assigns those when the whole draft is
//! written as one unit.
//!
//! ```rust,ignore
//! let draft = BillDraft::new(alice, "Pizza night")
//!     .with_tax(Money::new(dec!(4.00)))
//!     .item(ItemDraft::new("Pizza", Money::new(dec!(30.00)))
//!         .assign(alice, dec!(0.5))
//!         .assign(bob, dec!(0.5)));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Money, UserId};

/// Decimal places used for evenly split fractions
const EVEN_SPLIT_SCALE: u32 = 6;

/// Input for one user's portion of an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentDraft {
    pub user_id: UserId,
    pub fraction: Decimal,
}

/// Input for one item line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub description: String,
    pub cost: Money,
    pub assignments: Vec<AssignmentDraft>,
}

impl ItemDraft {
    /// Creates an item with no assignments yet
    pub fn new(description: impl Into<String>, cost: Money) -> Self {
        Self {
            description: description.into(),
            cost,
            assignments: Vec::new(),
        }
    }

    /// Adds an assignment
    pub fn assign(mut self, user_id: UserId, fraction: Decimal) -> Self {
        self.assignments.push(AssignmentDraft { user_id, fraction });
        self
    }

    /// Splits the item equally between `users`
    ///
    /// Fractions are rounded to six places and the last user absorbs the
    /// remainder, so the fractions always sum to exactly one.
    pub fn split_evenly(description: impl Into<String>, cost: Money, users: &[UserId]) -> Self {
        let mut item = Self::new(description, cost);
        let Some((last, rest)) = users.split_last() else {
            return item;
        };

        let share = (Decimal::ONE / Decimal::from(users.len())).round_dp(EVEN_SPLIT_SCALE);
        let mut assigned = Decimal::ZERO;
        for user_id in rest {
            item = item.assign(*user_id, share);
            assigned += share;
        }
        item.assign(*last, Decimal::ONE - assigned)
    }
}

/// Input for a whole bill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillDraft {
    pub payer_id: UserId,
    pub description: String,
    pub tax: Money,
    pub items: Vec<ItemDraft>,
}

impl BillDraft {
    /// Creates a bill draft with zero tax and no items
    pub fn new(payer_id: UserId, description: impl Into<String>) -> Self {
        Self {
            payer_id,
            description: description.into(),
            tax: Money::ZERO,
            items: Vec::new(),
        }
    }

    /// Sets the tax/fee amount
    pub fn with_tax(mut self, tax: Money) -> Self {
        self.tax = tax;
        self
    }

    /// Adds an item line
    pub fn item(mut self, item: ItemDraft) -> Self {
        self.items.push(item);
        self
    }

    /// Sum of item costs, before tax
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(|i| i.cost).sum()
    }

    /// Every user referenced by the draft (payer first, then assignees), deduplicated
    pub fn referenced_users(&self) -> Vec<UserId> {
        let mut users = vec![self.payer_id];
        for assignment in self.items.iter().flat_map(|i| i.assignments.iter()) {
            if !users.contains(&assignment.user_id) {
                users.push(assignment.user_id);
            }
        }
        users
    }
}
