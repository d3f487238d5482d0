//! Per-user share calculation
//!
//! A user's share of a bill is their fractional portion of every item plus
//! a slice of the tax proportional to that portion:
//!
//! ```text
//! subtotal      = Σ item.cost
//! user_subtotal = Σ item.cost × fraction     (assignments held by the user)
//! tax_share     = tax × user_subtotal / subtotal   (0 when subtotal is 0)
//! share         = user_subtotal + tax_share
//! ```
//!
//! Example: Pizza $30 to Alice, Salad $15 split between Bob and Carol, tax
//! $12. Alice pays 30 + 12 × 30/45 = 38.00; Bob and Carol each pay
//! 7.50 + 12 × 7.5/45 = 9.50.
//!
//! Arithmetic is exact and never rounded here. Because entered fractions may
//! only sum to 1 within a tolerance, the shares of a bill can differ from
//! its total by a few minor units; callers compare within a tolerance.

use std::collections::BTreeMap;

use core_kernel::{CurrencyPolicy, Money, UserId};

use crate::bill::ItemWithAssignments;

/// Computes exact per-user shares of a single bill
#[derive(Debug, Clone, Default)]
pub struct ShareCalculator {
    policy: CurrencyPolicy,
}

impl ShareCalculator {
    /// Creates a calculator that rounds with `policy` at display boundaries
    pub fn new(policy: CurrencyPolicy) -> Self {
        Self { policy }
    }

    /// The rounding policy used by [`ShareCalculator::rounded_share`]
    pub fn policy(&self) -> &CurrencyPolicy {
        &self.policy
    }

    /// Exact share of `user_id` in a bill with the given items and tax
    ///
    /// A user without assignments on the bill gets exactly zero.
    pub fn share(&self, items: &[ItemWithAssignments], tax: Money, user_id: UserId) -> Money {
        let subtotal: Money = items.iter().map(|i| i.item.cost).sum();
        let user_subtotal: Money = items
            .iter()
            .flat_map(|i| {
                i.assignments
                    .iter()
                    .filter(move |a| a.user_id == user_id)
                    .map(move |a| i.item.cost * a.fraction)
            })
            .sum();

        user_subtotal + proportional_tax(tax, user_subtotal, subtotal)
    }

    /// Share rounded to the smallest currency unit, for display or storage
    pub fn rounded_share(&self, items: &[ItemWithAssignments], tax: Money, user_id: UserId) -> Money {
        self.share(items, tax, user_id).rounded(&self.policy)
    }

    /// Exact shares of every assigned user in one pass, keyed by user id
    pub fn shares(&self, items: &[ItemWithAssignments], tax: Money) -> BTreeMap<UserId, Money> {
        let mut subtotals: BTreeMap<UserId, Money> = BTreeMap::new();
        let mut subtotal = Money::ZERO;

        for entry in items {
            subtotal += entry.item.cost;
            for assignment in &entry.assignments {
                *subtotals.entry(assignment.user_id).or_default() +=
                    entry.item.cost * assignment.fraction;
            }
        }

        subtotals
            .into_iter()
            .map(|(user_id, user_subtotal)| {
                (user_id, user_subtotal + proportional_tax(tax, user_subtotal, subtotal))
            })
            .collect()
    }
}

/// `tax × part / whole`, or zero when there is nothing to apportion against
pub(crate) fn proportional_tax(tax: Money, part: Money, whole: Money) -> Money {
    tax.apportion(part, whole).unwrap_or(Money::ZERO)
}
