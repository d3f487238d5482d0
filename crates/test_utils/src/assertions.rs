//! Custom Test Assertions
//!
//! Assertion helpers for ledger types that print both sides in a readable
//! form when they fail.

use core_kernel::{CurrencyPolicy, Money, UserId};
use domain_settlement::Balance;
use rust_decimal::Decimal;

fn cents(amount: Decimal) -> Decimal {
    Money::new(amount).rounded(&CurrencyPolicy::default()).amount()
}

/// Asserts that two amounts are equal once rounded to cents (half up)
///
/// # Panics
///
/// Panics if the rounded amounts differ
pub fn assert_amount_eq(actual: Money, expected: Decimal) {
    let rounded = cents(actual.amount());
    assert_eq!(
        rounded,
        cents(expected),
        "Amount mismatch: actual={} (exact {}), expected={}",
        rounded,
        actual.amount(),
        expected
    );
}

/// Asserts that two amounts differ by at most `tolerance`
pub fn assert_amount_within(actual: Money, expected: Decimal, tolerance: Decimal) {
    let diff = (actual.amount() - expected).abs();
    assert!(
        diff <= tolerance,
        "Amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual.amount(),
        expected,
        diff,
        tolerance
    );
}

/// Asserts that `balances` are exactly the expected `(debtor, creditor, amount)`
/// triples, in order, comparing amounts rounded to cents
pub fn assert_balances_eq(balances: &[Balance], expected: &[(UserId, UserId, Decimal)]) {
    let actual: Vec<(UserId, UserId, Decimal)> = balances
        .iter()
        .map(|b| (b.debtor_id(), b.creditor_id(), cents(b.amount().amount())))
        .collect();
    let expected: Vec<(UserId, UserId, Decimal)> = expected
        .iter()
        .map(|(d, c, amount)| (*d, *c, cents(*amount)))
        .collect();
    assert_eq!(actual, expected, "Balance list mismatch");
}

/// Asserts that no pair of users appears in both directions
pub fn assert_no_opposing_balances(balances: &[Balance]) {
    for b in balances {
        let opposing = balances
            .iter()
            .any(|o| o.debtor_id() == b.creditor_id() && o.creditor_id() == b.debtor_id());
        assert!(
            !opposing,
            "Both directions present for {} and {}",
            b.debtor_id(),
            b.creditor_id()
        );
    }
}

/// Asserts that balances are sorted by `(debtor, creditor)` with no repeats
pub fn assert_balances_sorted(balances: &[Balance]) {
    for pair in balances.windows(2) {
        let left = (pair[0].debtor_id(), pair[0].creditor_id());
        let right = (pair[1].debtor_id(), pair[1].creditor_id());
        assert!(left < right, "Balances out of order: {:?} before {:?}", left, right);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_assert_amount_eq_rounds() {
        assert_amount_eq(Money::new(dec!(15.004)), dec!(15));
    }

    #[test]
    #[should_panic(expected = "Amount mismatch")]
    fn test_assert_amount_eq_fails() {
        assert_amount_eq(Money::new(dec!(15.01)), dec!(15));
    }

    #[test]
    fn test_assert_balances_eq() {
        let b = Balance::new(UserId::new(2), UserId::new(1), Money::new(dec!(10.001))).unwrap();
        assert_balances_eq(&[b], &[(UserId::new(2), UserId::new(1), dec!(10))]);
        assert_no_opposing_balances(&[b]);
        assert_balances_sorted(&[b]);
    }
}
