//! Money types with precise decimal arithmetic
//!
//! This module provides a single-currency representation of monetary values
//! using rust_decimal for exact calculations without floating-point errors.
//!
//! `Money` never rounds on its own. Rounding to the smallest currency unit is
//! an explicit boundary step driven by a [`CurrencyPolicy`], so chained
//! calculations keep their full precision.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid amount: {input:?}")]
    InvalidAmount { input: String },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Arithmetic overflow")]
    Overflow,
}

/// Rounding mode applied when a value crosses a display or persistence boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Round half away from zero (0.005 -> 0.01)
    #[default]
    HalfUp,
    /// Banker's rounding (round half to even)
    HalfEven,
    /// Truncate toward zero
    Down,
}

impl RoundingMode {
    fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
            RoundingMode::Down => RoundingStrategy::ToZero,
        }
    }
}

/// Rounding and formatting rules for the ledger's single currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyPolicy {
    /// Number of decimal places in the smallest currency unit
    pub decimal_places: u32,
    /// Rounding mode used at boundaries
    pub rounding: RoundingMode,
    /// Symbol prefixed when formatting
    pub symbol: String,
}

impl Default for CurrencyPolicy {
    fn default() -> Self {
        Self {
            decimal_places: 2,
            rounding: RoundingMode::HalfUp,
            symbol: "$".to_string(),
        }
    }
}

impl CurrencyPolicy {
    /// Rounds a raw decimal to the smallest currency unit
    pub fn round(&self, value: Decimal) -> Decimal {
        value.round_dp_with_strategy(self.decimal_places, self.rounding.strategy())
    }

    /// The value of one smallest currency unit (0.01 for two places)
    pub fn minor_unit(&self) -> Decimal {
        Decimal::new(1, self.decimal_places)
    }
}

/// A monetary amount in the ledger currency
///
/// Arithmetic is exact. Amounts only lose precision when explicitly passed
/// through [`Money::rounded`] or [`Money::format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero amount
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Creates a new Money value without rounding
    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Creates Money from an integer amount in minor units (e.g., cents)
    pub fn from_minor(minor_units: i64, policy: &CurrencyPolicy) -> Self {
        Self(Decimal::new(minor_units, policy.decimal_places))
    }

    /// Parses user input such as `"$1,234.56"` or `" 12.5 "`
    pub fn parse(input: &str) -> Result<Self, MoneyError> {
        let cleaned: String = input
            .trim()
            .chars()
            .filter(|c| *c != '$' && *c != ',')
            .collect();
        Decimal::from_str(cleaned.trim())
            .map(Self)
            .map_err(|_| MoneyError::InvalidAmount {
                input: input.to_string(),
            })
    }

    /// Returns the amount
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly positive
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Returns true if the amount is strictly negative
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns the absolute value
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Multiplies by a scalar (fraction, ratio)
    pub fn multiply(&self, factor: Decimal) -> Self {
        Self(self.0 * factor)
    }

    /// Ratio of this amount to another, e.g. a user's subtotal over the bill subtotal
    pub fn ratio_of(&self, whole: Money) -> Result<Decimal, MoneyError> {
        if whole.is_zero() {
            return Err(MoneyError::DivisionByZero);
        }
        Ok(self.0 / whole.0)
    }

    /// `self × part / whole`, multiplying before dividing so that exact
    /// quotients (e.g. 12 × 30 / 45 = 8) stay exact
    ///
    /// When the product does not fit in a `Decimal` the ratio is taken first
    /// instead, which loses only digits beyond the 28th.
    pub fn apportion(&self, part: Money, whole: Money) -> Result<Money, MoneyError> {
        if whole.is_zero() {
            return Err(MoneyError::DivisionByZero);
        }
        if let Some(product) = self.0.checked_mul(part.0) {
            return product
                .checked_div(whole.0)
                .map(Self)
                .ok_or(MoneyError::Overflow);
        }
        part.0
            .checked_div(whole.0)
            .and_then(|ratio| self.0.checked_mul(ratio))
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }

    /// Rounds to the policy's smallest currency unit
    pub fn rounded(&self, policy: &CurrencyPolicy) -> Self {
        Self(policy.round(self.0))
    }

    /// Formats as a currency string, e.g. `$12.35`
    pub fn format(&self, policy: &CurrencyPolicy) -> String {
        let rounded = policy.round(self.0);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        format!(
            "{}{}{:.dp$}",
            sign,
            policy.symbol,
            rounded.abs(),
            dp = policy.decimal_places as usize
        )
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, factor: Decimal) -> Self {
        self.multiply(factor)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
