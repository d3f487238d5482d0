//! Settlement Domain - Balances and Settlement Epochs
//!
//! This crate turns the bills of the current epoch into the set of directed
//! balances that say who owes whom, and closes epochs with settlements.
//!
//! # Pipeline
//!
//! ```text
//! EpochManager ── bills since cutoff ──▶ DebtAggregator ── gross table ──▶ BalanceNetter
//!                                          │                                  │
//!                                          ▼                                  ▼
//!                                   ShareCalculator                      Vec<Balance>
//! ```
//!
//! - **Debt Aggregator**: every non-payer participant owes the payer their share
//! - **Balance Netter**: offsets the two directions of each pair, dropping
//!   differences within the netting threshold
//! - **Epoch Manager**: supplies the cutoff and records settlements
//!
//! Netting is pairwise only; multi-party cycles are not collapsed.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_settlement::BalanceService;
//!
//! for balance in balance_service.compute_balances()? {
//!     println!("{} owes {} {}", balance.debtor_id(), balance.creditor_id(), balance.amount());
//! }
//! balance_service.settle("March")?;
//! assert!(balance_service.compute_balances()?.is_empty());
//! ```

pub mod balance;
pub mod settlement;
pub mod aggregation;
pub mod netting;
pub mod epoch;
pub mod ports;
pub mod services;
pub mod error;

pub use balance::{Balance, UserBalances, SettlementPreview};
pub use settlement::Settlement;
pub use aggregation::{DebtAggregator, GrossDebtTable};
pub use netting::BalanceNetter;
pub use epoch::EpochManager;
pub use ports::{SettlementStore, LedgerStore, EpochSnapshot};
pub use services::{BalanceService, NamedBalance};
pub use error::SettlementError;
