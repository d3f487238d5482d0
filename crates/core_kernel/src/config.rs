//! Ledger configuration
//!
//! Tolerances, limits and the currency policy are plain values handed to
//! services at construction time. Nothing in the engine reads ambient
//! global state.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::money::CurrencyPolicy;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "LEDGER";

/// Engine-wide configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Allowed deviation of an item's fraction sum from 1.0
    pub fraction_tolerance: Decimal,
    /// Net pairwise amounts at or below this are treated as settled
    pub netting_threshold: Decimal,
    /// Rounding and formatting of the ledger currency
    pub currency: CurrencyPolicy,
    /// Largest accepted item cost or bill tax
    pub max_amount: Decimal,
    /// Maximum user name length in characters
    pub max_user_name_len: usize,
    /// Maximum bill description length in characters
    pub max_bill_description_len: usize,
    /// Maximum item description length in characters
    pub max_item_description_len: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            fraction_tolerance: dec!(0.001),
            netting_threshold: dec!(0.01),
            currency: CurrencyPolicy::default(),
            max_amount: dec!(1000000000),
            max_user_name_len: 100,
            max_bill_description_len: 500,
            max_item_description_len: 200,
        }
    }
}

impl LedgerConfig {
    /// Loads configuration from `LEDGER_*` environment variables
    ///
    /// A `.env` file in the working directory is read first when present.
    /// Nested keys use a double underscore, e.g.
    /// `LEDGER_CURRENCY__DECIMAL_PLACES=2`.
    pub fn from_env() -> Result<Self, CoreError> {
        dotenvy::dotenv().ok();
        Self::from_environment(Self::environment())
    }

    /// Loads configuration from an explicit environment source
    pub fn from_environment(environment: config::Environment) -> Result<Self, CoreError> {
        let loaded: LedgerConfig = config::Config::builder()
            .add_source(config::Config::try_from(&LedgerConfig::default())?)
            .add_source(environment)
            .build()?
            .try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// The environment source used by [`LedgerConfig::from_env`]
    pub fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
    }

    /// Rejects configurations the engine cannot honour
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.fraction_tolerance < Decimal::ZERO {
            return Err(CoreError::configuration(format!(
                "fraction_tolerance must be non-negative, got {}",
                self.fraction_tolerance
            )));
        }
        if self.netting_threshold < Decimal::ZERO {
            return Err(CoreError::configuration(format!(
                "netting_threshold must be non-negative, got {}",
                self.netting_threshold
            )));
        }
        if self.max_amount <= Decimal::ZERO {
            return Err(CoreError::configuration(format!(
                "max_amount must be positive, got {}",
                self.max_amount
            )));
        }
        if self.currency.decimal_places > 10 {
            return Err(CoreError::configuration(format!(
                "currency.decimal_places must be at most 10, got {}",
                self.currency.decimal_places
            )));
        }
        let limits = [
            ("max_user_name_len", self.max_user_name_len),
            ("max_bill_description_len", self.max_bill_description_len),
            ("max_item_description_len", self.max_item_description_len),
        ];
        for (name, limit) in limits {
            if limit == 0 {
                return Err(CoreError::configuration(format!("{} must be positive", name)));
            }
        }
        Ok(())
    }
}
