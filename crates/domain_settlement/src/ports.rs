//! Settlement Domain Ports
//!
//! The settlement store appends settlement markers and lists them. A
//! [`LedgerStore`] combines it with the bill store so the epoch manager can
//! read a cutoff and the bills after it as one consistent snapshot.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_settlement::ports::LedgerStore;
//! use std::sync::Arc;
//!
//! let store: Arc<dyn LedgerStore> = Arc::new(InMemoryLedgerStore::new());
//! let snapshot = store.read_epoch()?;
//! ```

use core_kernel::{epoch_origin, DomainPort, PortError, Timestamp};
use domain_bills::{BillRecord, BillStore};

use crate::settlement::Settlement;

/// Store operations for settlement markers
pub trait SettlementStore: DomainPort {
    /// Appends a settlement; the store assigns its id and may move
    /// `settled_at` forward so it sorts after every earlier write
    fn insert_settlement(&self, settled_at: Timestamp, note: &str) -> Result<Settlement, PortError>;

    /// The most recent settlement, if any
    fn get_latest_settlement(&self) -> Result<Option<Settlement>, PortError>;

    /// All settlements, newest first
    fn list_settlements(&self) -> Result<Vec<Settlement>, PortError>;
}

/// The latest settlement together with every bill created after it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpochSnapshot {
    pub settlement: Option<Settlement>,
    /// Bills with `created_at` strictly after the cutoff, oldest first
    pub bills: Vec<BillRecord>,
}

impl EpochSnapshot {
    /// Start of the epoch: the latest `settled_at`, or the epoch origin
    pub fn cutoff(&self) -> Timestamp {
        cutoff_of(self.settlement.as_ref())
    }
}

pub(crate) fn cutoff_of(settlement: Option<&Settlement>) -> Timestamp {
    settlement.map(|s| s.settled_at).unwrap_or_else(epoch_origin)
}

/// Bill and settlement storage with a consistent epoch read
pub trait LedgerStore: BillStore + SettlementStore {
    /// Reads the cutoff and the bills after it as one unit
    ///
    /// The default composes two reads and is only consistent if no write
    /// lands in between. Adapters with transactions or a shared lock should
    /// override it.
    fn read_epoch(&self) -> Result<EpochSnapshot, PortError> {
        let settlement = self.get_latest_settlement()?;
        let bills = self.list_bills_since(cutoff_of(settlement.as_ref()))?;
        Ok(EpochSnapshot { settlement, bills })
    }
}

/// In-memory ledger adapter for testing and embedding
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

    use core_kernel::{BillId, SettlementId, UserId};
    use domain_bills::ports::mock::MemoryBook;
    use domain_bills::{BillDraft, User, UserStore};

    #[derive(Debug, Default)]
    struct Ledger {
        book: MemoryBook,
        settlements: Vec<Settlement>,
    }

    /// Users, bills and settlements behind a single lock
    ///
    /// Every write takes the write guard and every epoch read takes one read
    /// guard, so a snapshot never sees half of a concurrent write and two
    /// settlements never interleave.
    #[derive(Debug, Default)]
    pub struct InMemoryLedgerStore {
        ledger: RwLock<Ledger>,
    }

    impl InMemoryLedgerStore {
        /// Creates an empty store
        pub fn new() -> Self {
            Self::default()
        }

        fn read(&self) -> Result<RwLockReadGuard<'_, Ledger>, PortError> {
            self.ledger
                .read()
                .map_err(|_| PortError::internal("ledger store lock poisoned"))
        }

        fn write(&self) -> Result<RwLockWriteGuard<'_, Ledger>, PortError> {
            self.ledger
                .write()
                .map_err(|_| PortError::internal("ledger store lock poisoned"))
        }
    }

    impl DomainPort for InMemoryLedgerStore {}

    impl UserStore for InMemoryLedgerStore {
        fn insert_user(&self, name: &str, created_at: Timestamp) -> Result<User, PortError> {
            self.write()?.book.insert_user(name, created_at)
        }

        fn get_user(&self, id: UserId) -> Result<User, PortError> {
            self.read()?.book.get_user(id)
        }

        fn find_user_by_name(&self, name: &str) -> Result<Option<User>, PortError> {
            Ok(self.read()?.book.find_user_by_name(name))
        }

        fn list_users(&self) -> Result<Vec<User>, PortError> {
            Ok(self.read()?.book.list_users())
        }

        fn update_user(&self, user: &User) -> Result<User, PortError> {
            self.write()?.book.update_user(user)
        }

        fn delete_user(&self, id: UserId) -> Result<(), PortError> {
            self.write()?.book.delete_user(id)
        }
    }

    impl BillStore for InMemoryLedgerStore {
        fn insert_bill(&self, draft: &BillDraft, created_at: Timestamp) -> Result<BillRecord, PortError> {
            self.write()?.book.insert_bill(draft, created_at)
        }

        fn get_bill(&self, id: BillId) -> Result<BillRecord, PortError> {
            self.read()?.book.get_bill(id)
        }

        fn list_bills(&self, limit: usize, offset: usize) -> Result<Vec<BillRecord>, PortError> {
            Ok(self.read()?.book.list_bills(limit, offset))
        }

        fn list_bills_by_payer(&self, payer_id: UserId) -> Result<Vec<BillRecord>, PortError> {
            Ok(self.read()?.book.list_bills_by_payer(payer_id))
        }

        fn list_bills_since(&self, cutoff: Timestamp) -> Result<Vec<BillRecord>, PortError> {
            Ok(self.read()?.book.list_bills_since(cutoff))
        }
    }

    impl SettlementStore for InMemoryLedgerStore {
        fn insert_settlement(&self, settled_at: Timestamp, note: &str) -> Result<Settlement, PortError> {
            let mut ledger = self.write()?;
            let settlement = Settlement {
                id: SettlementId::new(ledger.settlements.len() as i64 + 1),
                settled_at: ledger.book.stamp(settled_at),
                note: note.to_string(),
            };
            ledger.settlements.push(settlement.clone());
            Ok(settlement)
        }

        fn get_latest_settlement(&self) -> Result<Option<Settlement>, PortError> {
            Ok(self.read()?.settlements.last().cloned())
        }

        fn list_settlements(&self) -> Result<Vec<Settlement>, PortError> {
            Ok(self.read()?.settlements.iter().rev().cloned().collect())
        }
    }

    impl LedgerStore for InMemoryLedgerStore {
        fn read_epoch(&self) -> Result<EpochSnapshot, PortError> {
            let ledger = self.read()?;
            let settlement = ledger.settlements.last().cloned();
            let bills = ledger.book.list_bills_since(cutoff_of(settlement.as_ref()));
            Ok(EpochSnapshot { settlement, bills })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::InMemoryLedgerStore;
    use super::*;
    use chrono::{Duration, Utc};
    use core_kernel::{Money, UserId};
    use domain_bills::{BillDraft, ItemDraft};
    use rust_decimal_macros::dec;

    fn draft() -> BillDraft {
        BillDraft::new(UserId::new(1), "Pizza").item(
            ItemDraft::new("Pizza", Money::new(dec!(30)))
                .assign(UserId::new(1), dec!(0.5))
                .assign(UserId::new(2), dec!(0.5)),
        )
    }

    #[test]
    fn test_empty_store_snapshot() {
        let store = InMemoryLedgerStore::new();
        let snapshot = store.read_epoch().unwrap();
        assert!(snapshot.settlement.is_none());
        assert!(snapshot.bills.is_empty());
        assert_eq!(snapshot.cutoff(), epoch_origin());
    }

    #[test]
    fn test_settlements_listed_newest_first() {
        let store = InMemoryLedgerStore::new();
        let now = Utc::now();
        let first = store.insert_settlement(now, "first").unwrap();
        let second = store.insert_settlement(now + Duration::seconds(1), "second").unwrap();

        let listed = store.list_settlements().unwrap();
        assert_eq!(listed, vec![second.clone(), first]);
        assert_eq!(store.get_latest_settlement().unwrap(), Some(second));
    }

    #[test]
    fn test_settlement_sorts_after_same_instant_bill() {
        let store = InMemoryLedgerStore::new();
        let now = Utc::now();
        let bill = store.insert_bill(&draft(), now).unwrap();
        let settlement = store.insert_settlement(now, "same instant").unwrap();

        assert!(settlement.settled_at > bill.bill.created_at);
        assert!(store.read_epoch().unwrap().bills.is_empty());
    }

    #[test]
    fn test_snapshot_holds_only_bills_after_cutoff() {
        let store = InMemoryLedgerStore::new();
        let now = Utc::now();
        store.insert_bill(&draft(), now).unwrap();
        store.insert_settlement(now + Duration::seconds(1), "close").unwrap();
        let later = store.insert_bill(&draft(), now + Duration::seconds(2)).unwrap();

        let snapshot = store.read_epoch().unwrap();
        assert_eq!(snapshot.bills, vec![later]);
        assert_eq!(store.list_bills(10, 0).unwrap().len(), 2);
    }

    #[test]
    fn test_locked_read_matches_composed_reads() {
        let store = InMemoryLedgerStore::new();
        store.insert_bill(&draft(), Utc::now()).unwrap();
        let direct = store.read_epoch().unwrap();
        let settlement = store.get_latest_settlement().unwrap();
        let bills = store.list_bills_since(cutoff_of(settlement.as_ref())).unwrap();
        assert_eq!(direct, EpochSnapshot { settlement, bills });
    }
}
