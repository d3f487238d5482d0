//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random bills that satisfy
//! the validation rules. Users are referred to by index so the same plan can
//! be replayed against any set of stored user ids.

use core_kernel::{Money, UserId};
use domain_bills::{BillDraft, ItemDraft};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Number of decimal places used for generated fractions
const FRACTION_SCALE: u32 = 4;

/// Strategy for positive amounts in cents, up to 10,000.00
pub fn cost_cents_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000i64
}

/// Strategy for non-negative tax in cents, up to 500.00
pub fn tax_cents_strategy() -> impl Strategy<Value = i64> {
    0i64..50_000i64
}

/// Strategy for `n` fractions in (0, 1] that sum to exactly one
///
/// Fractions are drawn as integer weights and rounded to four places; the
/// last fraction absorbs the remainder. `n` of zero is treated as one.
pub fn fractions_strategy(n: usize) -> impl Strategy<Value = Vec<Decimal>> {
    let n = n.max(1);
    proptest::collection::vec(1u32..=100u32, n).prop_map(move |weights| {
        let total: u32 = weights.iter().sum();
        let mut fractions: Vec<Decimal> = weights
            .iter()
            .map(|w| (Decimal::from(*w) / Decimal::from(total)).round_dp(FRACTION_SCALE))
            .map(|f| f.max(Decimal::new(1, FRACTION_SCALE)))
            .collect();
        let head: Decimal = fractions[..n - 1].iter().sum();
        fractions[n - 1] = Decimal::ONE - head;
        fractions
    })
    .prop_filter("every fraction must be positive", |fractions| {
        fractions.iter().all(|f| *f > Decimal::ZERO)
    })
}

/// One item line over user indices
#[derive(Debug, Clone)]
pub struct ItemPlan {
    pub cost_cents: i64,
    pub split: Vec<(usize, Decimal)>,
}

/// A whole bill over user indices
#[derive(Debug, Clone)]
pub struct BillPlan {
    pub payer: usize,
    pub tax_cents: i64,
    pub items: Vec<ItemPlan>,
}

impl BillPlan {
    /// Resolves user indices against `users` and builds a draft
    pub fn to_draft(&self, users: &[UserId]) -> BillDraft {
        self.items.iter().enumerate().fold(
            BillDraft::new(users[self.payer], "Generated bill")
                .with_tax(Money::new(Decimal::new(self.tax_cents, 2))),
            |draft, (n, item)| {
                let line = item.split.iter().fold(
                    ItemDraft::new(format!("Item {}", n + 1), Money::new(Decimal::new(item.cost_cents, 2))),
                    |line, (user, fraction)| line.assign(users[*user], *fraction),
                );
                draft.item(line)
            },
        )
    }
}

/// Strategy for one item split between distinct users drawn from `user_count`
pub fn item_plan_strategy(user_count: usize) -> impl Strategy<Value = ItemPlan> {
    (
        cost_cents_strategy(),
        proptest::sample::subsequence((0..user_count).collect::<Vec<_>>(), 1..=user_count),
    )
        .prop_flat_map(|(cost_cents, users)| {
            let n = users.len();
            (Just(cost_cents), Just(users), fractions_strategy(n))
        })
        .prop_map(|(cost_cents, users, fractions)| ItemPlan {
            cost_cents,
            split: users.into_iter().zip(fractions).collect(),
        })
}

/// Strategy for a valid bill over `user_count` users (at least two)
pub fn bill_plan_strategy(user_count: usize) -> impl Strategy<Value = BillPlan> {
    (
        0..user_count,
        tax_cents_strategy(),
        proptest::collection::vec(item_plan_strategy(user_count), 1..5),
    )
        .prop_map(|(payer, tax_cents, items)| BillPlan {
            payer,
            tax_cents,
            items,
        })
}

/// Strategy for a sequence of bills
pub fn bill_plans_strategy(user_count: usize, max_bills: usize) -> impl Strategy<Value = Vec<BillPlan>> {
    proptest::collection::vec(bill_plan_strategy(user_count), 0..=max_bills)
}
