//! Settlement domain services
//!
//! `BalanceService` is what callers talk to: current balances, per-user
//! debts and credits, settlement previews and the settlement history. It
//! also answers [`BalanceLookup`] so `UserService` can refuse to delete a
//! user who still owes or is owed money.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use core_kernel::{CurrencyPolicy, LedgerConfig, Money, PortError, SharedClock, UserId};
use domain_bills::{BalanceLookup, UserStore};

use crate::balance::{Balance, SettlementPreview, UserBalances};
use crate::epoch::EpochManager;
use crate::error::SettlementError;
use crate::ports::LedgerStore;
use crate::settlement::Settlement;

/// A balance with both users' names resolved, for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedBalance {
    pub debtor_id: UserId,
    pub debtor_name: Option<String>,
    pub creditor_id: UserId,
    pub creditor_name: Option<String>,
    /// Rounded to the currency's smallest unit
    pub amount: Money,
}

/// Caller-facing balance and settlement operations
pub struct BalanceService {
    epochs: EpochManager,
    users: Arc<dyn UserStore>,
    policy: CurrencyPolicy,
}

impl BalanceService {
    /// Creates a balance service over a ledger store
    ///
    /// `users` is only used to check that a user exists and to resolve names.
    pub fn new(
        ledger: Arc<dyn LedgerStore>,
        users: Arc<dyn UserStore>,
        clock: SharedClock,
        config: &LedgerConfig,
    ) -> Self {
        Self {
            epochs: EpochManager::new(ledger, clock, config),
            users,
            policy: config.currency.clone(),
        }
    }

    /// The epoch manager behind this service
    pub fn epochs(&self) -> &EpochManager {
        &self.epochs
    }

    /// All net balances of the current epoch, sorted by `(debtor, creditor)`
    pub fn compute_balances(&self) -> Result<Vec<Balance>, SettlementError> {
        Ok(self.epochs.get_all_balances()?)
    }

    /// The current balances in which `user_id` is debtor or creditor
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub fn compute_user_balances(&self, user_id: UserId) -> Result<UserBalances, SettlementError> {
        self.users
            .get_user(user_id)
            .map_err(|e| SettlementError::from_user_lookup(user_id, e))?;

        let balances = self.compute_balances()?;
        Ok(UserBalances::for_user(&balances, user_id))
    }

    /// Current balances with names resolved and amounts rounded for display
    pub fn describe_balances(&self) -> Result<Vec<NamedBalance>, SettlementError> {
        self.compute_balances()?
            .into_iter()
            .map(|b| {
                Ok(NamedBalance {
                    debtor_id: b.debtor_id(),
                    debtor_name: self.resolve_name(b.debtor_id())?,
                    creditor_id: b.creditor_id(),
                    creditor_name: self.resolve_name(b.creditor_id())?,
                    amount: b.rounded_amount(&self.policy),
                })
            })
            .collect()
    }

    /// The balances a settlement would clear and their exact total
    pub fn preview_settlement(&self) -> Result<SettlementPreview, SettlementError> {
        Ok(self.epochs.preview_settlement()?)
    }

    /// Closes the current epoch
    pub fn settle(&self, note: &str) -> Result<Settlement, SettlementError> {
        Ok(self.epochs.settle_all_balances(note)?)
    }

    pub fn last_settlement(&self) -> Result<Option<Settlement>, SettlementError> {
        Ok(self.epochs.get_last_settlement()?)
    }

    /// Every settlement, newest first
    pub fn settlement_history(&self) -> Result<Vec<Settlement>, SettlementError> {
        Ok(self.epochs.get_settlement_history()?)
    }

    fn resolve_name(&self, user_id: UserId) -> Result<Option<String>, SettlementError> {
        match self.users.get_user(user_id) {
            Ok(user) => Ok(Some(user.name)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl BalanceLookup for BalanceService {
    fn has_outstanding_balances(&self, user_id: UserId) -> Result<bool, PortError> {
        let outstanding = self.epochs.user_has_outstanding_balances(user_id)?;
        debug!(user_id = %user_id, outstanding, "Checked outstanding balances");
        Ok(outstanding)
    }
}
