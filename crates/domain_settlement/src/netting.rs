//! Pairwise balance netting
//!
//! For each unordered pair `{a, b}` the two gross directions are offset:
//!
//! ```text
//! delta = gross(a → b) − gross(b → a)
//! delta >  threshold   →  a owes b  delta
//! delta < −threshold   →  b owes a −delta
//! otherwise            →  settled, nothing emitted
//! ```
//!
//! The threshold (one cent by default) absorbs the rounding residue left by
//! fractions that only sum to one within tolerance.
//!
//! # Known limitation
//!
//! Netting is strictly pairwise. A cycle such as A owes B, B owes C and
//! C owes A by the same amount produces three balances, not zero.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use tracing::debug;

use core_kernel::{Money, UserId};

use crate::aggregation::GrossDebtTable;
use crate::balance::Balance;

/// Collapses a gross debt table into directed net balances
#[derive(Debug, Clone)]
pub struct BalanceNetter {
    threshold: Decimal,
}

impl BalanceNetter {
    /// Default dead-band below which a pair counts as settled
    pub const DEFAULT_THRESHOLD: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

    /// Creates a netter that ignores net differences of at most `threshold`
    pub fn new(threshold: Decimal) -> Self {
        Self {
            threshold: threshold.abs(),
        }
    }

    pub fn threshold(&self) -> Decimal {
        self.threshold
    }

    /// Nets every pair once; output sorted by `(debtor, creditor)`
    pub fn net(&self, table: &GrossDebtTable) -> Vec<Balance> {
        let pairs: BTreeSet<(UserId, UserId)> = table
            .iter()
            .map(|(d, c, _)| if d < c { (d, c) } else { (c, d) })
            .collect();

        let mut balances: Vec<Balance> = pairs
            .into_iter()
            .filter_map(|(a, b)| self.net_pair(table, a, b))
            .collect();
        balances.sort_by_key(|b| (b.debtor_id(), b.creditor_id()));

        debug!(balances = balances.len(), "Netted balances");
        balances
    }

    fn net_pair(&self, table: &GrossDebtTable, a: UserId, b: UserId) -> Option<Balance> {
        let delta = (table.get(a, b) - table.get(b, a)).amount();

        let (debtor, creditor, amount) = if delta > self.threshold {
            (a, b, delta)
        } else if delta < -self.threshold {
            (b, a, -delta)
        } else {
            return None;
        };

        Balance::new(debtor, creditor, Money::new(amount)).ok()
    }
}

impl Default for BalanceNetter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn table_strategy() -> impl Strategy<Value = GrossDebtTable> {
        proptest::collection::vec((1i64..=5, 1i64..=5, 0i64..100_000), 0..30).prop_map(|entries| {
            let mut table = GrossDebtTable::new();
            for (d, c, cents) in entries {
                table.add(UserId::new(d), UserId::new(c), Money::new(Decimal::new(cents, 2)));
            }
            table
        })
    }

    proptest! {
        #[test]
        fn netting_is_idempotent(table in table_strategy()) {
            let netter = BalanceNetter::default();
            prop_assert_eq!(netter.net(&table), netter.net(&table));
        }

        #[test]
        fn at_most_one_direction_per_pair(table in table_strategy()) {
            let balances = BalanceNetter::default().net(&table);
            for b in &balances {
                prop_assert_ne!(b.debtor_id(), b.creditor_id());
                prop_assert!(b.amount().amount() > BalanceNetter::DEFAULT_THRESHOLD);
                let reversed = balances
                    .iter()
                    .filter(|o| o.debtor_id() == b.creditor_id() && o.creditor_id() == b.debtor_id())
                    .count();
                prop_assert_eq!(reversed, 0);
            }
        }

        #[test]
        fn output_is_sorted_and_unique(table in table_strategy()) {
            let keys: Vec<_> = BalanceNetter::default()
                .net(&table)
                .iter()
                .map(|b| (b.debtor_id(), b.creditor_id()))
                .collect();
            let mut sorted = keys.clone();
            sorted.sort();
            sorted.dedup();
            prop_assert_eq!(keys, sorted);
        }

        #[test]
        fn net_position_is_preserved(table in table_strategy()) {
            let balances = BalanceNetter::new(Decimal::ZERO).net(&table);
            for user in 1i64..=5 {
                let user = UserId::new(user);
                let gross: Decimal = table
                    .iter()
                    .map(|(d, c, m)| {
                        if c == user { m.amount() } else if d == user { -m.amount() } else { Decimal::ZERO }
                    })
                    .sum();
                let net: Decimal = balances
                    .iter()
                    .map(|b| {
                        if b.creditor_id() == user { b.amount().amount() }
                        else if b.debtor_id() == user { -b.amount().amount() }
                        else { Decimal::ZERO }
                    })
                    .sum();
                prop_assert_eq!(gross, net);
            }
        }
    }
}
