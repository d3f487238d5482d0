//! Pre-built Test Fixtures
//!
//! Ready-to-use values for ledger tests. Amounts and timestamps are fixed so
//! expected balances can be written down by hand.

use chrono::{DateTime, Duration, TimeZone, Utc};
use core_kernel::{LedgerConfig, Money};
use rust_decimal_macros::dec;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// The pizza from the canonical even-split example
    pub fn pizza() -> Money {
        Money::new(dec!(30.00))
    }

    /// A salad shared between two people
    pub fn salad() -> Money {
        Money::new(dec!(15.00))
    }

    /// A typical tax/tip amount
    pub fn tax() -> Money {
        Money::new(dec!(12.00))
    }

    /// One minor unit
    pub fn one_cent() -> Money {
        Money::new(dec!(0.01))
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Ledger start (Jan 1, 2024 00:00 UTC)
    pub fn ledger_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// End of the first month
    pub fn month_end() -> DateTime<Utc> {
        Self::ledger_start() + Duration::days(31)
    }
}

/// Canonical user names
pub struct NameFixtures;

impl NameFixtures {
    pub const ALICE: &'static str = "Alice";
    pub const BOB: &'static str = "Bob";
    pub const CAROL: &'static str = "Carol";
    pub const DAVE: &'static str = "Dave";

    /// A name exactly at the default length limit
    pub fn longest_valid() -> String {
        "n".repeat(100)
    }
}

/// Configuration fixtures
pub struct ConfigFixtures;

impl ConfigFixtures {
    /// The default engine configuration
    pub fn standard() -> LedgerConfig {
        LedgerConfig::default()
    }

    /// Exact fraction sums and no netting dead-band
    pub fn exact() -> LedgerConfig {
        LedgerConfig {
            fraction_tolerance: dec!(0),
            netting_threshold: dec!(0),
            ..LedgerConfig::default()
        }
    }
}
