//! Settlement epochs
//!
//! An epoch is the span of bills after the latest settlement. Balances are
//! always recomputed from the bills of the current epoch; settling appends
//! a new marker and leaves every bill in place.
//!
//! ```text
//!  bills:   b1  b2  b3 │ b4  b5 │ b6
//!  settle:             S1       S2
//!                                 └─ current epoch: {b6}
//! ```

use std::sync::Arc;

use tracing::{debug, info, instrument};

use core_kernel::{LedgerConfig, PortError, SharedClock, Timestamp, UserId};
use domain_bills::{BillRecord, ShareCalculator};

use crate::aggregation::DebtAggregator;
use crate::balance::{Balance, SettlementPreview};
use crate::netting::BalanceNetter;
use crate::ports::{cutoff_of, EpochSnapshot, LedgerStore};
use crate::settlement::Settlement;

/// Tracks settlement boundaries and computes balances for the current epoch
pub struct EpochManager {
    store: Arc<dyn LedgerStore>,
    clock: SharedClock,
    aggregator: DebtAggregator,
    netter: BalanceNetter,
}

impl EpochManager {
    pub fn new(store: Arc<dyn LedgerStore>, clock: SharedClock, config: &LedgerConfig) -> Self {
        Self {
            store,
            clock,
            aggregator: DebtAggregator::new(ShareCalculator::new(config.currency.clone())),
            netter: BalanceNetter::new(config.netting_threshold),
        }
    }

    /// `settled_at` of the latest settlement, or the epoch origin if none
    pub fn cutoff(&self) -> Result<Timestamp, PortError> {
        Ok(cutoff_of(self.store.get_latest_settlement()?.as_ref()))
    }

    /// Bills created strictly after the cutoff, oldest first
    pub fn bills_in_epoch(&self) -> Result<Vec<BillRecord>, PortError> {
        Ok(self.store.read_epoch()?.bills)
    }

    /// Net balances over the current epoch, sorted by `(debtor, creditor)`
    #[instrument(skip(self))]
    pub fn get_all_balances(&self) -> Result<Vec<Balance>, PortError> {
        let snapshot = self.store.read_epoch()?;
        Ok(self.balances_of(&snapshot))
    }

    /// The balances a settlement would clear and their sum; writes nothing
    pub fn preview_settlement(&self) -> Result<SettlementPreview, PortError> {
        Ok(SettlementPreview::new(self.get_all_balances()?))
    }

    /// Closes the current epoch with a new settlement stamped now
    ///
    /// Bills are untouched. Right after this call the new epoch holds no
    /// bills, so balances are empty.
    #[instrument(skip(self))]
    pub fn settle_all_balances(&self, note: &str) -> Result<Settlement, PortError> {
        let settlement = self.store.insert_settlement(self.clock.utc(), note)?;
        info!(
            settlement_id = %settlement.id,
            settled_at = %settlement.settled_at,
            "Settlement recorded"
        );
        Ok(settlement)
    }

    pub fn get_last_settlement(&self) -> Result<Option<Settlement>, PortError> {
        self.store.get_latest_settlement()
    }

    /// Every settlement, newest first
    pub fn get_settlement_history(&self) -> Result<Vec<Settlement>, PortError> {
        self.store.list_settlements()
    }

    /// True if the user is a debtor or creditor in the current epoch
    pub fn user_has_outstanding_balances(&self, user_id: UserId) -> Result<bool, PortError> {
        Ok(self
            .get_all_balances()?
            .iter()
            .any(|b| b.involves(user_id)))
    }

    fn balances_of(&self, snapshot: &EpochSnapshot) -> Vec<Balance> {
        debug!(
            cutoff = %snapshot.cutoff(),
            bills = snapshot.bills.len(),
            "Computing balances for current epoch"
        );
        if snapshot.bills.is_empty() {
            return Vec::new();
        }
        self.netter.net(&self.aggregator.aggregate(&snapshot.bills))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mock::InMemoryLedgerStore;
    use core_kernel::temporal::mock::ManualClock;
    use core_kernel::{epoch_origin, Clock, Money};
    use domain_bills::{BillDraft, BillStore, ItemDraft};
    use rust_decimal_macros::dec;

    const ALICE: UserId = UserId::new(1);
    const BOB: UserId = UserId::new(2);

    struct Fixture {
        store: Arc<InMemoryLedgerStore>,
        clock: Arc<ManualClock>,
        epochs: EpochManager,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryLedgerStore::new());
        let clock = Arc::new(ManualClock::at_default_start());
        let epochs = EpochManager::new(store.clone(), clock.clone(), &LedgerConfig::default());
        Fixture { store, clock, epochs }
    }

    fn record(f: &Fixture, payer: UserId, other: UserId, cost: rust_decimal::Decimal) {
        f.clock.advance_seconds(60);
        let draft = BillDraft::new(payer, "Shared").item(
            ItemDraft::new("Item", Money::new(cost))
                .assign(payer, dec!(0.5))
                .assign(other, dec!(0.5)),
        );
        f.store.insert_bill(&draft, f.clock.utc()).unwrap();
    }

    #[test]
    fn test_cutoff_starts_at_origin() {
        let f = fixture();
        assert_eq!(f.epochs.cutoff().unwrap(), epoch_origin());
        assert!(f.epochs.get_last_settlement().unwrap().is_none());
        assert!(f.epochs.get_all_balances().unwrap().is_empty());
    }

    #[test]
    fn test_settle_clears_balances_but_keeps_bills() {
        let f = fixture();
        record(&f, ALICE, BOB, dec!(50));
        record(&f, BOB, ALICE, dec!(30));
        assert_eq!(f.epochs.get_all_balances().unwrap().len(), 1);

        f.clock.advance_seconds(60);
        let settlement = f.epochs.settle_all_balances("month end").unwrap();

        assert_eq!(f.epochs.cutoff().unwrap(), settlement.settled_at);
        assert!(f.epochs.get_all_balances().unwrap().is_empty());
        assert!(f.epochs.bills_in_epoch().unwrap().is_empty());
        assert_eq!(f.store.list_bills(10, 0).unwrap().len(), 2);
    }

    #[test]
    fn test_new_epoch_ignores_settled_bills() {
        let f = fixture();
        record(&f, ALICE, BOB, dec!(50));
        f.clock.advance_seconds(60);
        f.epochs.settle_all_balances("done").unwrap();
        record(&f, ALICE, BOB, dec!(30));

        let balances = f.epochs.get_all_balances().unwrap();
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].amount().amount(), dec!(15));
    }

    #[test]
    fn test_preview_writes_nothing() {
        let f = fixture();
        record(&f, ALICE, BOB, dec!(20));
        let preview = f.epochs.preview_settlement().unwrap();

        assert_eq!(preview.total.amount(), dec!(10));
        assert!(f.epochs.get_settlement_history().unwrap().is_empty());
    }

    #[test]
    fn test_settlement_at_same_instant_as_bill() {
        let f = fixture();
        record(&f, ALICE, BOB, dec!(20));
        f.epochs.settle_all_balances("no clock movement").unwrap();
        assert!(f.epochs.get_all_balances().unwrap().is_empty());
    }

    #[test]
    fn test_history_newest_first() {
        let f = fixture();
        let first = f.epochs.settle_all_balances("first").unwrap();
        f.clock.advance_seconds(1);
        let second = f.epochs.settle_all_balances("second").unwrap();

        assert_eq!(f.epochs.get_settlement_history().unwrap(), vec![second.clone(), first]);
        assert_eq!(f.epochs.get_last_settlement().unwrap(), Some(second));
    }

    #[test]
    fn test_outstanding_balances_lookup() {
        let f = fixture();
        record(&f, ALICE, BOB, dec!(20));
        assert!(f.epochs.user_has_outstanding_balances(ALICE).unwrap());
        assert!(f.epochs.user_has_outstanding_balances(BOB).unwrap());
        assert!(!f.epochs.user_has_outstanding_balances(UserId::new(3)).unwrap());

        f.epochs.settle_all_balances("clear").unwrap();
        assert!(!f.epochs.user_has_outstanding_balances(ALICE).unwrap());
    }
}
