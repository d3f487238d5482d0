//! Bills domain services
//!
//! `BillService` validates and records bills and answers share questions
//! about a single bill. `UserService` manages participants and consults a
//! [`BalanceLookup`] before deleting anyone.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use core_kernel::{AssignmentId, BillId, ItemId, LedgerConfig, Money, PortError, SharedClock, UserId};

use crate::bill::{Assignment, BillRecord, Item, ItemWithAssignments};
use crate::draft::BillDraft;
use crate::error::{BillError, ValidationError};
use crate::ports::{BalanceLookup, BillStore, UserStore};
use crate::share::ShareCalculator;
use crate::user::User;
use crate::validation::BillValidator;

/// One participant's exact share of a bill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantShare {
    pub user_id: UserId,
    /// Resolved display name; `None` if the user no longer exists
    pub name: Option<String>,
    pub amount: Money,
}

/// What a draft would cost each participant, computed without writing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillPreview {
    pub payer_id: UserId,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    pub shares: Vec<ParticipantShare>,
}

/// A stored bill with names and shares resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillDetail {
    pub record: BillRecord,
    pub payer_name: Option<String>,
    /// Non-zero shares, ordered by user id
    pub shares: Vec<ParticipantShare>,
}

/// Service for recording bills and computing per-bill shares
pub struct BillService {
    users: Arc<dyn UserStore>,
    bills: Arc<dyn BillStore>,
    clock: SharedClock,
    validator: BillValidator,
    calculator: ShareCalculator,
}

impl BillService {
    /// Creates a bill service over the given stores
    pub fn new(
        users: Arc<dyn UserStore>,
        bills: Arc<dyn BillStore>,
        clock: SharedClock,
        config: &LedgerConfig,
    ) -> Self {
        Self {
            users,
            bills,
            clock,
            validator: BillValidator::new(config.clone()),
            calculator: ShareCalculator::new(config.currency.clone()),
        }
    }

    /// Validates and records a bill with all of its items and assignments
    ///
    /// Nothing is written unless every rule passes and every referenced user
    /// exists; the store then writes the whole bill as one unit.
    ///
    /// # Errors
    ///
    /// - `BillError::Validation` for malformed input
    /// - `BillError::UserNotFound` if the payer or an assignee is unknown
    #[instrument(skip(self, draft), fields(payer_id = %draft.payer_id, items = draft.items.len()))]
    pub fn create_bill(&self, draft: &BillDraft) -> Result<BillRecord, BillError> {
        self.check_draft(draft)?;

        let record = self.bills.insert_bill(draft, self.clock.utc())?;
        info!(bill_id = %record.bill.id, total = %record.total(), "Bill recorded");
        Ok(record)
    }

    /// Computes the shares a draft would produce without recording it
    #[instrument(skip(self, draft), fields(payer_id = %draft.payer_id))]
    pub fn preview_bill(&self, draft: &BillDraft) -> Result<BillPreview, BillError> {
        self.check_draft(draft)?;

        let items = preview_items(draft);
        let shares = self.calculator.shares(&items, draft.tax);
        let subtotal = draft.subtotal();

        Ok(BillPreview {
            payer_id: draft.payer_id,
            subtotal,
            tax: draft.tax,
            total: subtotal + draft.tax,
            shares: self.named_shares(shares, false)?,
        })
    }

    /// Retrieves a bill with its payer's name and every participant's share
    #[instrument(skip(self), fields(bill_id = %bill_id))]
    pub fn get_bill(&self, bill_id: BillId) -> Result<BillDetail, BillError> {
        let record = self.load_bill(bill_id)?;
        let payer_name = self.resolve_name(record.bill.payer_id)?;
        let shares = self.calculator.shares(&record.items, record.bill.tax);

        Ok(BillDetail {
            shares: self.named_shares(shares, true)?,
            payer_name,
            record,
        })
    }

    /// Exact share of one user in a stored bill; zero if they have no assignments
    #[instrument(skip(self), fields(bill_id = %bill_id, user_id = %user_id))]
    pub fn calculate_user_share(&self, bill_id: BillId, user_id: UserId) -> Result<Money, BillError> {
        let record = self.load_bill(bill_id)?;
        Ok(self.calculator.share(&record.items, record.bill.tax, user_id))
    }

    /// Subtotal plus tax of a stored bill
    pub fn calculate_total_cost(&self, bill_id: BillId) -> Result<Money, BillError> {
        Ok(self.load_bill(bill_id)?.total())
    }

    /// Lists bills newest first
    pub fn list_bills(&self, limit: usize, offset: usize) -> Result<Vec<BillRecord>, BillError> {
        Ok(self.bills.list_bills(limit, offset)?)
    }

    /// Lists bills paid by one user, newest first
    pub fn list_bills_by_payer(&self, payer_id: UserId) -> Result<Vec<BillRecord>, BillError> {
        self.users
            .get_user(payer_id)
            .map_err(|e| BillError::from_user_lookup(payer_id, e))?;
        Ok(self.bills.list_bills_by_payer(payer_id)?)
    }

    fn check_draft(&self, draft: &BillDraft) -> Result<(), BillError> {
        self.validator.validate_bill(draft)?;
        for user_id in draft.referenced_users() {
            self.users
                .get_user(user_id)
                .map_err(|e| BillError::from_user_lookup(user_id, e))?;
        }
        Ok(())
    }

    fn load_bill(&self, bill_id: BillId) -> Result<BillRecord, BillError> {
        self.bills
            .get_bill(bill_id)
            .map_err(|e| BillError::from_bill_lookup(bill_id, e))
    }

    fn resolve_name(&self, user_id: UserId) -> Result<Option<String>, BillError> {
        match self.users.get_user(user_id) {
            Ok(user) => Ok(Some(user.name)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn named_shares(
        &self,
        shares: BTreeMap<UserId, Money>,
        skip_zero: bool,
    ) -> Result<Vec<ParticipantShare>, BillError> {
        shares
            .into_iter()
            .filter(|(_, amount)| !(skip_zero && amount.is_zero()))
            .map(|(user_id, amount)| {
                Ok(ParticipantShare {
                    user_id,
                    name: self.resolve_name(user_id)?,
                    amount,
                })
            })
            .collect()
    }
}

/// Builds throwaway records from a draft so the calculator can run on it
fn preview_items(draft: &BillDraft) -> Vec<ItemWithAssignments> {
    draft
        .items
        .iter()
        .enumerate()
        .map(|(n, item)| {
            let item_id = ItemId::new(n as i64 + 1);
            ItemWithAssignments {
                item: Item {
                    id: item_id,
                    bill_id: BillId::new(0),
                    description: item.description.clone(),
                    cost: item.cost,
                },
                assignments: item
                    .assignments
                    .iter()
                    .map(|a| Assignment {
                        id: AssignmentId::new(0),
                        item_id,
                        user_id: a.user_id,
                        fraction: a.fraction,
                    })
                    .collect(),
            }
        })
        .collect()
}

/// Service for managing ledger participants
pub struct UserService {
    users: Arc<dyn UserStore>,
    balances: Arc<dyn BalanceLookup>,
    clock: SharedClock,
    validator: BillValidator,
}

impl UserService {
    /// Creates a user service; `balances` is consulted before any deletion
    pub fn new(
        users: Arc<dyn UserStore>,
        balances: Arc<dyn BalanceLookup>,
        clock: SharedClock,
        config: &LedgerConfig,
    ) -> Self {
        Self {
            users,
            balances,
            clock,
            validator: BillValidator::new(config.clone()),
        }
    }

    /// Registers a new user with a unique name
    #[instrument(skip(self))]
    pub fn create_user(&self, name: &str) -> Result<User, BillError> {
        let name = name.trim();
        self.validator.validate_user_name(name)?;
        if self.users.find_user_by_name(name)?.is_some() {
            return Err(duplicate_name(name));
        }

        let user = self
            .users
            .insert_user(name, self.clock.utc())
            .map_err(|e| conflict_as_duplicate(name, e))?;
        info!(user_id = %user.id, "User created");
        Ok(user)
    }

    /// Retrieves a user by ID
    pub fn get_user(&self, user_id: UserId) -> Result<User, BillError> {
        self.users
            .get_user(user_id)
            .map_err(|e| BillError::from_user_lookup(user_id, e))
    }

    /// Lists all users ordered by name
    pub fn list_users(&self) -> Result<Vec<User>, BillError> {
        Ok(self.users.list_users()?)
    }

    /// Changes a user's name, keeping names unique
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub fn rename_user(&self, user_id: UserId, name: &str) -> Result<User, BillError> {
        let name = name.trim();
        self.validator.validate_user_name(name)?;
        let user = self.get_user(user_id)?;

        if let Some(existing) = self.users.find_user_by_name(name)? {
            if existing.id != user_id {
                return Err(duplicate_name(name));
            }
        }

        let renamed = self
            .users
            .update_user(&user.with_name(name))
            .map_err(|e| conflict_as_duplicate(name, e))?;
        info!("User renamed");
        Ok(renamed)
    }

    /// Deletes a user who neither owes nor is owed anything right now
    ///
    /// Users referenced only by bills from settled epochs may be deleted.
    ///
    /// # Errors
    ///
    /// `BillError::OutstandingBalances` if the user is a debtor or creditor
    /// in the current epoch.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub fn delete_user(&self, user_id: UserId) -> Result<(), BillError> {
        self.get_user(user_id)?;

        if self.balances.has_outstanding_balances(user_id)? {
            warn!("Refusing to delete user with outstanding balances");
            return Err(BillError::OutstandingBalances { user_id });
        }

        self.users
            .delete_user(user_id)
            .map_err(|e| BillError::from_user_lookup(user_id, e))?;
        debug!("User deleted");
        Ok(())
    }
}

fn duplicate_name(name: &str) -> BillError {
    ValidationError::DuplicateUserName {
        name: name.to_string(),
    }
    .into()
}

fn conflict_as_duplicate(name: &str, err: PortError) -> BillError {
    match err {
        PortError::Conflict { .. } => duplicate_name(name),
        other => other.into(),
    }
}
