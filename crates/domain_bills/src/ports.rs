//! Bills Domain Ports
//!
//! Store interfaces for users and bills. The engine reads plain records
//! through these traits and never touches storage directly.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_bills::ports::{BillStore, UserStore};
//! use std::sync::Arc;
//!
//! pub struct BillService {
//!     users: Arc<dyn UserStore>,
//!     bills: Arc<dyn BillStore>,
//! }
//! ```
//!
//! All operations are synchronous and run to completion. Adapters backed by
//! a database should map each method onto a single transaction.

use core_kernel::{BillId, DomainPort, PortError, Timestamp, UserId};

use crate::bill::BillRecord;
use crate::draft::BillDraft;
use crate::user::User;

/// Store operations for ledger participants
pub trait UserStore: DomainPort {
    /// Inserts a new user; fails with `PortError::Conflict` on a duplicate name
    fn insert_user(&self, name: &str, created_at: Timestamp) -> Result<User, PortError>;

    /// Retrieves a user by ID, or `PortError::NotFound`
    fn get_user(&self, id: UserId) -> Result<User, PortError>;

    /// Finds a user by exact name
    fn find_user_by_name(&self, name: &str) -> Result<Option<User>, PortError>;

    /// Lists all users ordered by name
    fn list_users(&self) -> Result<Vec<User>, PortError>;

    /// Replaces a user's mutable fields (the name)
    fn update_user(&self, user: &User) -> Result<User, PortError>;

    /// Removes a user
    fn delete_user(&self, id: UserId) -> Result<(), PortError>;
}

/// Store operations for bills and their items and assignments
pub trait BillStore: DomainPort {
    /// Writes a bill with all of its items and assignments as one unit
    ///
    /// Either every row becomes visible or none does. The store assigns all
    /// identifiers and may move `created_at` forward to keep write
    /// timestamps strictly increasing.
    fn insert_bill(&self, draft: &BillDraft, created_at: Timestamp) -> Result<BillRecord, PortError>;

    /// Retrieves a bill with its items and assignments
    fn get_bill(&self, id: BillId) -> Result<BillRecord, PortError>;

    /// Lists bills newest first
    fn list_bills(&self, limit: usize, offset: usize) -> Result<Vec<BillRecord>, PortError>;

    /// Lists bills paid by `payer_id`, newest first
    fn list_bills_by_payer(&self, payer_id: UserId) -> Result<Vec<BillRecord>, PortError>;

    /// Lists bills with `created_at` strictly after `cutoff`, oldest first
    fn list_bills_since(&self, cutoff: Timestamp) -> Result<Vec<BillRecord>, PortError>;
}

/// Answers whether a user is currently a debtor or creditor
///
/// Implemented by the settlement side and handed to `UserService` at
/// construction so deletion can be vetoed without a back-reference.
pub trait BalanceLookup: Send + Sync {
    fn has_outstanding_balances(&self, user_id: UserId) -> Result<bool, PortError>;
}

/// In-memory store adapter for testing and embedding
///
/// `MemoryBook` holds the rows and implements the store semantics over
/// plain `&self`/`&mut self` methods, so other adapters can wrap it together
/// with additional state under a single lock.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

    use core_kernel::temporal::strictly_after;
    use core_kernel::{AssignmentId, ItemId};

    use crate::bill::{Assignment, Bill, Item, ItemWithAssignments};

    /// Row storage shared by the in-memory adapters
    #[derive(Debug, Default)]
    pub struct MemoryBook {
        users: BTreeMap<UserId, User>,
        bills: BTreeMap<BillId, BillRecord>,
        next_user: i64,
        next_bill: i64,
        next_item: i64,
        next_assignment: i64,
        last_write: Option<Timestamp>,
    }

    impl MemoryBook {
        /// Creates an empty book
        pub fn new() -> Self {
            Self::default()
        }

        /// Reserves a write timestamp strictly after every earlier write
        pub fn stamp(&mut self, requested: Timestamp) -> Timestamp {
            let stamped = strictly_after(self.last_write, requested);
            self.last_write = Some(stamped);
            stamped
        }

        pub fn insert_user(&mut self, name: &str, created_at: Timestamp) -> Result<User, PortError> {
            if self.users.values().any(|u| u.name == name) {
                return Err(PortError::conflict(format!("user name {:?} already exists", name)));
            }
            self.next_user += 1;
            let user = User {
                id: UserId::new(self.next_user),
                name: name.to_string(),
                created_at: self.stamp(created_at),
            };
            self.users.insert(user.id, user.clone());
            Ok(user)
        }

        pub fn get_user(&self, id: UserId) -> Result<User, PortError> {
            self.users
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("User", id))
        }

        pub fn find_user_by_name(&self, name: &str) -> Option<User> {
            self.users.values().find(|u| u.name == name).cloned()
        }

        pub fn list_users(&self) -> Vec<User> {
            let mut users: Vec<User> = self.users.values().cloned().collect();
            users.sort_by(|a, b| a.name.cmp(&b.name));
            users
        }

        pub fn update_user(&mut self, user: &User) -> Result<User, PortError> {
            if self.users.values().any(|u| u.name == user.name && u.id != user.id) {
                return Err(PortError::conflict(format!(
                    "user name {:?} already exists",
                    user.name
                )));
            }
            let stored = self
                .users
                .get_mut(&user.id)
                .ok_or_else(|| PortError::not_found("User", user.id))?;
            stored.name = user.name.clone();
            Ok(stored.clone())
        }

        pub fn delete_user(&mut self, id: UserId) -> Result<(), PortError> {
            self.users
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("User", id))
        }

        pub fn insert_bill(
            &mut self,
            draft: &BillDraft,
            created_at: Timestamp,
        ) -> Result<BillRecord, PortError> {
            self.next_bill += 1;
            let bill_id = BillId::new(self.next_bill);
            let mut items = Vec::with_capacity(draft.items.len());

            for item_draft in &draft.items {
                self.next_item += 1;
                let item_id = ItemId::new(self.next_item);
                let mut assignments = Vec::with_capacity(item_draft.assignments.len());
                for assignment in &item_draft.assignments {
                    self.next_assignment += 1;
                    assignments.push(Assignment {
                        id: AssignmentId::new(self.next_assignment),
                        item_id,
                        user_id: assignment.user_id,
                        fraction: assignment.fraction,
                    });
                }
                items.push(ItemWithAssignments {
                    item: Item {
                        id: item_id,
                        bill_id,
                        description: item_draft.description.clone(),
                        cost: item_draft.cost,
                    },
                    assignments,
                });
            }

            let record = BillRecord {
                bill: Bill {
                    id: bill_id,
                    payer_id: draft.payer_id,
                    description: draft.description.clone(),
                    tax: draft.tax,
                    created_at: self.stamp(created_at),
                },
                items,
            };
            self.bills.insert(bill_id, record.clone());
            Ok(record)
        }

        pub fn get_bill(&self, id: BillId) -> Result<BillRecord, PortError> {
            self.bills
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Bill", id))
        }

        fn newest_first<'a>(records: impl Iterator<Item = &'a BillRecord>) -> Vec<BillRecord> {
            let mut bills: Vec<BillRecord> = records.cloned().collect();
            bills.sort_by(|a, b| b.bill.created_at.cmp(&a.bill.created_at));
            bills
        }

        pub fn list_bills(&self, limit: usize, offset: usize) -> Vec<BillRecord> {
            Self::newest_first(self.bills.values())
                .into_iter()
                .skip(offset)
                .take(limit)
                .collect()
        }

        pub fn list_bills_by_payer(&self, payer_id: UserId) -> Vec<BillRecord> {
            Self::newest_first(self.bills.values().filter(|r| r.bill.payer_id == payer_id))
        }

        pub fn list_bills_since(&self, cutoff: Timestamp) -> Vec<BillRecord> {
            let mut bills: Vec<BillRecord> = self
                .bills
                .values()
                .filter(|r| r.bill.created_at > cutoff)
                .cloned()
                .collect();
            bills.sort_by(|a, b| a.bill.created_at.cmp(&b.bill.created_at));
            bills
        }
    }

    /// Balance lookup that reports a fixed set of users as owing or owed
    #[derive(Debug, Default)]
    pub struct FixedBalanceLookup {
        outstanding: RwLock<std::collections::BTreeSet<UserId>>,
    }

    impl FixedBalanceLookup {
        /// A lookup where nobody has a balance
        pub fn none() -> Self {
            Self::default()
        }

        /// Marks a user as having an outstanding balance
        pub fn mark(&self, user_id: UserId) {
            if let Ok(mut outstanding) = self.outstanding.write() {
                outstanding.insert(user_id);
            }
        }

        /// Clears a user's outstanding balance
        pub fn clear(&self, user_id: UserId) {
            if let Ok(mut outstanding) = self.outstanding.write() {
                outstanding.remove(&user_id);
            }
        }
    }

    impl BalanceLookup for FixedBalanceLookup {
        fn has_outstanding_balances(&self, user_id: UserId) -> Result<bool, PortError> {
            self.outstanding
                .read()
                .map(|outstanding| outstanding.contains(&user_id))
                .map_err(|_| PortError::internal("balance lookup lock poisoned"))
        }
    }

    /// Thread-safe in-memory implementation of `UserStore` and `BillStore`
    #[derive(Debug, Default)]
    pub struct InMemoryBillStore {
        book: RwLock<MemoryBook>,
    }

    impl InMemoryBillStore {
        /// Creates an empty store
        pub fn new() -> Self {
            Self::default()
        }

        fn read(&self) -> Result<RwLockReadGuard<'_, MemoryBook>, PortError> {
            self.book
                .read()
                .map_err(|_| PortError::internal("bill store lock poisoned"))
        }

        fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryBook>, PortError> {
            self.book
                .write()
                .map_err(|_| PortError::internal("bill store lock poisoned"))
        }
    }

    impl DomainPort for InMemoryBillStore {}

    impl UserStore for InMemoryBillStore {
        fn insert_user(&self, name: &str, created_at: Timestamp) -> Result<User, PortError> {
            self.write()?.insert_user(name, created_at)
        }

        fn get_user(&self, id: UserId) -> Result<User, PortError> {
            self.read()?.get_user(id)
        }

        fn find_user_by_name(&self, name: &str) -> Result<Option<User>, PortError> {
            Ok(self.read()?.find_user_by_name(name))
        }

        fn list_users(&self) -> Result<Vec<User>, PortError> {
            Ok(self.read()?.list_users())
        }

        fn update_user(&self, user: &User) -> Result<User, PortError> {
            self.write()?.update_user(user)
        }

        fn delete_user(&self, id: UserId) -> Result<(), PortError> {
            self.write()?.delete_user(id)
        }
    }

    impl BillStore for InMemoryBillStore {
        fn insert_bill(&self, draft: &BillDraft, created_at: Timestamp) -> Result<BillRecord, PortError> {
            self.write()?.insert_bill(draft, created_at)
        }

        fn get_bill(&self, id: BillId) -> Result<BillRecord, PortError> {
            self.read()?.get_bill(id)
        }

        fn list_bills(&self, limit: usize, offset: usize) -> Result<Vec<BillRecord>, PortError> {
            Ok(self.read()?.list_bills(limit, offset))
        }

        fn list_bills_by_payer(&self, payer_id: UserId) -> Result<Vec<BillRecord>, PortError> {
            Ok(self.read()?.list_bills_by_payer(payer_id))
        }

        fn list_bills_since(&self, cutoff: Timestamp) -> Result<Vec<BillRecord>, PortError> {
            Ok(self.read()?.list_bills_since(cutoff))
        }
    }
}
