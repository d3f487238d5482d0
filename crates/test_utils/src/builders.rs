//! Test Data Builders
//!
//! Builders for bill drafts with sensible defaults, so tests only spell out
//! what matters to them.

use core_kernel::{Money, UserId};
use domain_bills::{BillDraft, ItemDraft};
use rust_decimal::Decimal;

/// Builder for constructing bill drafts
///
/// ```rust,ignore
/// let draft = BillDraftBuilder::paid_by(alice.id)
///     .tax(dec!(4))
///     .even_item("Pizza", dec!(30), &[alice.id, bob.id])
///     .item("Wine", dec!(20), &[(bob.id, dec!(1))])
///     .build();
/// ```
pub struct BillDraftBuilder {
    payer_id: UserId,
    description: String,
    tax: Decimal,
    items: Vec<ItemDraft>,
}

impl BillDraftBuilder {
    /// Starts a bill paid by `payer_id` with no items and no tax
    pub fn paid_by(payer_id: UserId) -> Self {
        Self {
            payer_id,
            description: "Test bill".to_string(),
            tax: Decimal::ZERO,
            items: Vec::new(),
        }
    }

    /// Sets the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the tax amount
    pub fn tax(mut self, tax: Decimal) -> Self {
        self.tax = tax;
        self
    }

    /// Adds an item with explicit fractions
    pub fn item(mut self, description: &str, cost: Decimal, split: &[(UserId, Decimal)]) -> Self {
        let item = split
            .iter()
            .fold(ItemDraft::new(description, Money::new(cost)), |item, (user_id, fraction)| {
                item.assign(*user_id, *fraction)
            });
        self.items.push(item);
        self
    }

    /// Adds an item split equally between `users`
    pub fn even_item(mut self, description: &str, cost: Decimal, users: &[UserId]) -> Self {
        self.items
            .push(ItemDraft::split_evenly(description, Money::new(cost), users));
        self
    }

    /// Adds an item owned entirely by one user
    pub fn solo_item(self, description: &str, cost: Decimal, user_id: UserId) -> Self {
        self.item(description, cost, &[(user_id, Decimal::ONE)])
    }

    /// Builds the draft
    pub fn build(self) -> BillDraft {
        self.items.into_iter().fold(
            BillDraft::new(self.payer_id, self.description).with_tax(Money::new(self.tax)),
            BillDraft::item,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_builder_assembles_draft() {
        let alice = UserId::new(1);
        let bob = UserId::new(2);
        let draft = BillDraftBuilder::paid_by(alice)
            .description("Dinner")
            .tax(dec!(3))
            .even_item("Pizza", dec!(30), &[alice, bob])
            .solo_item("Wine", dec!(20), bob)
            .build();

        assert_eq!(draft.payer_id, alice);
        assert_eq!(draft.description, "Dinner");
        assert_eq!(draft.tax.amount(), dec!(3));
        assert_eq!(draft.items.len(), 2);
        assert_eq!(draft.subtotal().amount(), dec!(50));
    }
}
