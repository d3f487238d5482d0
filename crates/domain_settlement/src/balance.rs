//! Net balances between pairs of users
//!
//! Balances are derived on every query from the bills of the current epoch
//! and are never stored.

use serde::{Deserialize, Serialize};

use core_kernel::{CurrencyPolicy, Money, UserId};

use crate::error::SettlementError;

/// A directed, positive amount that `debtor_id` owes `creditor_id`
///
/// Two balances with the same three fields are interchangeable; a balance
/// has no identity of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawBalance")]
pub struct Balance {
    debtor_id: UserId,
    creditor_id: UserId,
    amount: Money,
}

impl Balance {
    /// Creates a balance, rejecting self-debts and non-positive amounts
    pub fn new(debtor_id: UserId, creditor_id: UserId, amount: Money) -> Result<Self, SettlementError> {
        if debtor_id == creditor_id || !amount.is_positive() {
            return Err(SettlementError::InvalidBalance {
                debtor_id,
                creditor_id,
                amount: amount.amount(),
            });
        }
        Ok(Self {
            debtor_id,
            creditor_id,
            amount,
        })
    }

    pub fn debtor_id(&self) -> UserId {
        self.debtor_id
    }

    pub fn creditor_id(&self) -> UserId {
        self.creditor_id
    }

    /// Exact amount owed
    pub fn amount(&self) -> Money {
        self.amount
    }

    /// True if `user_id` is either side of this balance
    pub fn involves(&self, user_id: UserId) -> bool {
        self.debtor_id == user_id || self.creditor_id == user_id
    }

    /// The amount rounded for display
    ///
    /// May be zero when the exact amount is below half a minor unit, which
    /// happens only with a netting threshold under that size.
    pub fn rounded_amount(&self, policy: &CurrencyPolicy) -> Money {
        self.amount.rounded(policy)
    }
}

#[derive(Deserialize)]
struct RawBalance {
    debtor_id: UserId,
    creditor_id: UserId,
    amount: Money,
}

impl TryFrom<RawBalance> for Balance {
    type Error = SettlementError;

    fn try_from(raw: RawBalance) -> Result<Self, Self::Error> {
        Balance::new(raw.debtor_id, raw.creditor_id, raw.amount)
    }
}

/// A user's current debts and credits
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBalances {
    /// Balances where the user is the debtor
    pub debts: Vec<Balance>,
    /// Balances where the user is the creditor
    pub credits: Vec<Balance>,
}

impl UserBalances {
    /// Splits the balances that involve `user_id` by direction
    pub fn for_user(balances: &[Balance], user_id: UserId) -> Self {
        let (debts, credits) = balances
            .iter()
            .copied()
            .filter(|b| b.involves(user_id))
            .partition(|b| b.debtor_id == user_id);
        Self { debts, credits }
    }

    /// Credits minus debts; positive when the user is owed money overall
    pub fn net_position(&self) -> Money {
        let owed: Money = self.credits.iter().map(|b| b.amount).sum();
        let owing: Money = self.debts.iter().map(|b| b.amount).sum();
        owed - owing
    }

    pub fn is_empty(&self) -> bool {
        self.debts.is_empty() && self.credits.is_empty()
    }
}

/// What settling now would clear, computed without writing anything
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementPreview {
    pub balances: Vec<Balance>,
    /// Exact sum of all balance amounts
    pub total: Money,
}

impl SettlementPreview {
    pub fn new(balances: Vec<Balance>) -> Self {
        let total = balances.iter().map(|b| b.amount).sum();
        Self { balances, total }
    }
}
