//! Persisted bill records
//!
//! A bill exclusively owns its items and each item exclusively owns its
//! assignments. All three are written once, as a unit, and never mutated.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use core_kernel::{AssignmentId, BillId, ItemId, Money, Timestamp, UserId};

/// One expense event fronted by a single payer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    pub id: BillId,
    /// The user who paid; never a debtor on this bill
    pub payer_id: UserId,
    pub description: String,
    /// Tax, tip and fees, distributed in proportion to item shares
    pub tax: Money,
    pub created_at: Timestamp,
}

impl Bill {
    /// Returns a copy with a different description
    pub fn with_description(&self, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..self.clone()
        }
    }
}

/// A single cost line within a bill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub bill_id: BillId,
    pub description: String,
    pub cost: Money,
}

/// Fractional ownership of one item by one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub item_id: ItemId,
    pub user_id: UserId,
    /// Portion of the item cost, in (0, 1]
    pub fraction: Decimal,
}

/// An item together with the assignments that divide it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemWithAssignments {
    pub item: Item,
    pub assignments: Vec<Assignment>,
}

impl ItemWithAssignments {
    /// Sum of this item's fractions
    pub fn fraction_total(&self) -> Decimal {
        self.assignments.iter().map(|a| a.fraction).sum()
    }
}

/// A bill as read back from the store, carrying its items and assignments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillRecord {
    pub bill: Bill,
    pub items: Vec<ItemWithAssignments>,
}

impl BillRecord {
    /// Sum of item costs, before tax
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(|i| i.item.cost).sum()
    }

    /// Subtotal plus tax
    pub fn total(&self) -> Money {
        self.subtotal() + self.bill.tax
    }

    /// Distinct users holding at least one assignment, in id order
    pub fn participants(&self) -> BTreeSet<UserId> {
        self.items
            .iter()
            .flat_map(|i| i.assignments.iter().map(|a| a.user_id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn record() -> BillRecord {
        let bill_id = BillId::new(1);
        let item = |id: i64, cost: Decimal, users: &[(i64, Decimal)]| ItemWithAssignments {
            item: Item {
                id: ItemId::new(id),
                bill_id,
                description: format!("item {}", id),
                cost: Money::new(cost),
            },
            assignments: users
                .iter()
                .enumerate()
                .map(|(n, (user, fraction))| Assignment {
                    id: AssignmentId::new(id * 10 + n as i64),
                    item_id: ItemId::new(id),
                    user_id: UserId::new(*user),
                    fraction: *fraction,
                })
                .collect(),
        };

        BillRecord {
            bill: Bill {
                id: bill_id,
                payer_id: UserId::new(1),
                description: "Dinner".to_string(),
                tax: Money::new(dec!(4.50)),
                created_at: Utc::now(),
            },
            items: vec![
                item(1, dec!(30), &[(1, dec!(1))]),
                item(2, dec!(15), &[(3, dec!(0.5)), (2, dec!(0.5))]),
            ],
        }
    }

    #[test]
    fn test_totals() {
        let record = record();
        assert_eq!(record.subtotal().amount(), dec!(45));
        assert_eq!(record.total().amount(), dec!(49.50));
    }

    #[test]
    fn test_participants_are_distinct_and_ordered() {
        let participants: Vec<_> = record().participants().into_iter().collect();
        assert_eq!(participants, vec![UserId::new(1), UserId::new(2), UserId::new(3)]);
    }

    #[test]
    fn test_with_description_copies() {
        let record = record();
        let renamed = record.bill.with_description("Lunch");
        assert_eq!(renamed.description, "Lunch");
        assert_eq!(renamed.id, record.bill.id);
        assert_eq!(record.bill.description, "Dinner");
    }
}
