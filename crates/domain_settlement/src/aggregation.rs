//! Gross debt aggregation
//!
//! Turns a window of bills into a table of who owes whom before any
//! offsetting. For each bill every assigned user other than the payer owes
//! the payer their share; the payer's own share is simply paid.
//!
//! Bills are folded in independently, so the resulting table does not
//! depend on the order the bills arrive in.

use std::collections::BTreeMap;

use tracing::debug;

use core_kernel::{Money, UserId};
use domain_bills::{BillRecord, ShareCalculator};

/// Accumulated one-directional debts keyed by `(debtor, creditor)`
///
/// Every stored amount is positive and no key has `debtor == creditor`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrossDebtTable {
    debts: BTreeMap<(UserId, UserId), Money>,
}

impl GrossDebtTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `amount` to what `debtor` owes `creditor`
    ///
    /// Self-debts and non-positive amounts are ignored.
    pub fn add(&mut self, debtor: UserId, creditor: UserId, amount: Money) {
        if debtor == creditor || !amount.is_positive() {
            return;
        }
        *self.debts.entry((debtor, creditor)).or_default() += amount;
    }

    /// Gross amount `debtor` owes `creditor`, zero if none
    pub fn get(&self, debtor: UserId, creditor: UserId) -> Money {
        self.debts
            .get(&(debtor, creditor))
            .copied()
            .unwrap_or(Money::ZERO)
    }

    /// Entries in `(debtor, creditor)` order
    pub fn iter(&self) -> impl Iterator<Item = (UserId, UserId, Money)> + '_ {
        self.debts.iter().map(|(&(d, c), &amount)| (d, c, amount))
    }

    /// Number of directed pairs with a debt
    pub fn len(&self) -> usize {
        self.debts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.debts.is_empty()
    }
}

/// Builds gross debt tables from bills
#[derive(Debug, Clone, Default)]
pub struct DebtAggregator {
    calculator: ShareCalculator,
}

impl DebtAggregator {
    pub fn new(calculator: ShareCalculator) -> Self {
        Self { calculator }
    }

    /// Folds every bill into a fresh table
    pub fn aggregate(&self, bills: &[BillRecord]) -> GrossDebtTable {
        let mut table = GrossDebtTable::new();
        for record in bills {
            self.add_bill(&mut table, record);
        }
        debug!(bills = bills.len(), pairs = table.len(), "Aggregated gross debts");
        table
    }

    /// Adds one bill's debts to `table`
    pub fn add_bill(&self, table: &mut GrossDebtTable, record: &BillRecord) {
        let payer = record.bill.payer_id;
        for (user_id, share) in self.calculator.shares(&record.items, record.bill.tax) {
            if user_id != payer {
                table.add(user_id, payer, share);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use core_kernel::{AssignmentId, BillId, ItemId};
    use domain_bills::{Assignment, Bill, Item, ItemWithAssignments};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    const ALICE: UserId = UserId::new(1);
    const BOB: UserId = UserId::new(2);
    const CAROL: UserId = UserId::new(3);

    fn bill(id: i64, payer: UserId, cost: Decimal, tax: Decimal, split: &[(UserId, Decimal)]) -> BillRecord {
        let item_id = ItemId::new(id);
        BillRecord {
            bill: Bill {
                id: BillId::new(id),
                payer_id: payer,
                description: format!("bill {}", id),
                tax: Money::new(tax),
                created_at: Utc::now(),
            },
            items: vec![ItemWithAssignments {
                item: Item {
                    id: item_id,
                    bill_id: BillId::new(id),
                    description: "item".to_string(),
                    cost: Money::new(cost),
                },
                assignments: split
                    .iter()
                    .enumerate()
                    .map(|(n, (user_id, fraction))| Assignment {
                        id: AssignmentId::new(id * 10 + n as i64),
                        item_id,
                        user_id: *user_id,
                        fraction: *fraction,
                    })
                    .collect(),
            }],
        }
    }

    #[test]
    fn test_payer_share_is_not_a_debt() {
        let bills = vec![bill(1, ALICE, dec!(30), dec!(0), &[(ALICE, dec!(0.5)), (BOB, dec!(0.5))])];
        let table = DebtAggregator::default().aggregate(&bills);

        assert_eq!(table.len(), 1);
        assert_eq!(table.get(BOB, ALICE).amount(), dec!(15));
        assert!(table.get(ALICE, ALICE).is_zero());
    }

    #[test]
    fn test_debts_accumulate_across_bills() {
        let bills = vec![
            bill(1, ALICE, dec!(50), dec!(0), &[(ALICE, dec!(0.5)), (BOB, dec!(0.5))]),
            bill(2, ALICE, dec!(20), dec!(10), &[(ALICE, dec!(0.5)), (BOB, dec!(0.5))]),
            bill(3, BOB, dec!(30), dec!(0), &[(ALICE, dec!(0.5)), (BOB, dec!(0.5))]),
        ];
        let table = DebtAggregator::default().aggregate(&bills);

        assert_eq!(table.get(BOB, ALICE).amount(), dec!(40));
        assert_eq!(table.get(ALICE, BOB).amount(), dec!(15));
    }

    #[test]
    fn test_payer_without_assignment() {
        let bills = vec![bill(1, CAROL, dec!(10), dec!(2), &[(ALICE, dec!(0.5)), (BOB, dec!(0.5))])];
        let table = DebtAggregator::default().aggregate(&bills);

        assert_eq!(table.get(ALICE, CAROL).amount(), dec!(6));
        assert_eq!(table.get(BOB, CAROL).amount(), dec!(6));
    }

    #[test]
    fn test_table_ignores_self_and_zero() {
        let mut table = GrossDebtTable::new();
        table.add(ALICE, ALICE, Money::new(dec!(5)));
        table.add(ALICE, BOB, Money::ZERO);
        assert!(table.is_empty());
    }

    #[test]
    fn test_empty_window() {
        assert!(DebtAggregator::default().aggregate(&[]).is_empty());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::Utc;
    use core_kernel::{AssignmentId, BillId, ItemId};
    use domain_bills::{Assignment, Bill, Item, ItemWithAssignments};
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    fn bill_strategy() -> impl Strategy<Value = BillRecord> {
        (1i64..=4, 1i64..50_000, 0i64..2_000, proptest::collection::btree_set(1i64..=4, 1..=4))
            .prop_map(|(payer, cents, tax_cents, users)| {
                let users: Vec<i64> = users.into_iter().collect();
                let share = (Decimal::ONE / Decimal::from(users.len())).round_dp(4);
                let last = users.len() - 1;
                let item_id = ItemId::new(1);
                BillRecord {
                    bill: Bill {
                        id: BillId::new(1),
                        payer_id: UserId::new(payer),
                        description: String::new(),
                        tax: Money::new(Decimal::new(tax_cents, 2)),
                        created_at: Utc::now(),
                    },
                    items: vec![ItemWithAssignments {
                        item: Item {
                            id: item_id,
                            bill_id: BillId::new(1),
                            description: "item".to_string(),
                            cost: Money::new(Decimal::new(cents, 2)),
                        },
                        assignments: users
                            .iter()
                            .enumerate()
                            .map(|(n, user)| Assignment {
                                id: AssignmentId::new(n as i64),
                                item_id,
                                user_id: UserId::new(*user),
                                fraction: if n == last {
                                    Decimal::ONE - share * Decimal::from(last)
                                } else {
                                    share
                                },
                            })
                            .collect(),
                    }],
                }
            })
    }

    fn normalized(table: &GrossDebtTable) -> Vec<(UserId, UserId, Decimal)> {
        table.iter().map(|(d, c, m)| (d, c, m.amount().round_dp(12))).collect()
    }

    proptest! {
        #[test]
        fn aggregation_is_order_independent(
            bills in proptest::collection::vec(bill_strategy(), 0..12),
            seed in any::<u64>(),
        ) {
            let aggregator = DebtAggregator::default();
            let mut shuffled = bills.clone();
            let len = shuffled.len();
            if len > 1 {
                shuffled.rotate_left((seed as usize) % len);
                shuffled.reverse();
            }

            prop_assert_eq!(
                normalized(&aggregator.aggregate(&bills)),
                normalized(&aggregator.aggregate(&shuffled))
            );
        }

        #[test]
        fn payer_never_owes_themselves(bills in proptest::collection::vec(bill_strategy(), 0..12)) {
            let table = DebtAggregator::default().aggregate(&bills);
            for (debtor, creditor, amount) in table.iter() {
                prop_assert_ne!(debtor, creditor);
                prop_assert!(amount.is_positive());
            }
        }
    }
}
