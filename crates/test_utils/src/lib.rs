//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! ledger engine test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built test data for common values
//! - `builders`: Builder patterns for bill drafts
//! - `ledger`: A fully wired in-memory ledger with a manual clock
//! - `assertions`: Custom assertion helpers for amounts and balances
//! - `generators`: Property-based test data generators
//! - `telemetry`: Idempotent tracing subscriber setup

pub mod fixtures;
pub mod builders;
pub mod ledger;
pub mod assertions;
pub mod generators;
pub mod telemetry;

pub use fixtures::*;
pub use builders::*;
pub use ledger::*;
pub use assertions::*;
pub use generators::*;
pub use telemetry::init_tracing;
