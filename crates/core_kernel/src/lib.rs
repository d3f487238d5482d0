//! Core Kernel - Foundational types for the shared-expense ledger
//!
//! This crate provides the building blocks used by the domain crates:
//! - Money with exact decimal arithmetic and an explicit rounding policy
//! - Numeric identifiers for users, bills, items, assignments and settlements
//! - Time helpers and an injectable clock
//! - Engine configuration
//! - Port error type shared by all store adapters

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod config;
pub mod ports;
pub mod error;

pub use money::{Money, MoneyError, CurrencyPolicy, RoundingMode};
pub use temporal::{Clock, DefaultClock, SharedClock, Timestamp, epoch_origin, system_clock};
pub use identifiers::{UserId, BillId, ItemId, AssignmentId, SettlementId};
pub use config::LedgerConfig;
pub use ports::{PortError, DomainPort};
pub use error::CoreError;
