//! Input validation for users and bills
//!
//! # Validation Rules
//!
//! ## User names
//! - Must not be empty or whitespace
//! - At most `max_user_name_len` characters
//!
//! ## Bills
//! - At least one item
//! - Tax must be non-negative and at most `max_amount`
//! - Description at most `max_bill_description_len` characters
//!
//! ## Items
//! - Description must not be blank, at most `max_item_description_len` characters
//! - Cost must be positive and at most `max_amount`
//! - At least one assignment, no user assigned twice
//! - Every fraction in (0, 1]
//! - Fractions sum to 1 within `fraction_tolerance`
//!
//! Rules are checked in the order above and the first violation is
//! returned. Existence of the referenced users is a store concern and is
//! checked by `BillService`.

use rust_decimal::Decimal;

use core_kernel::LedgerConfig;

use crate::draft::{BillDraft, ItemDraft};
use crate::error::{TextField, ValidationError};

/// Validator for user names and bill drafts
#[derive(Debug, Clone)]
pub struct BillValidator {
    config: LedgerConfig,
}

impl BillValidator {
    /// Creates a validator enforcing the limits in `config`
    pub fn new(config: LedgerConfig) -> Self {
        Self { config }
    }

    /// Validates a user name
    pub fn validate_user_name(&self, name: &str) -> Result<(), ValidationError> {
        check_text(name, TextField::UserName, self.config.max_user_name_len, true)
    }

    /// Validates a complete bill draft
    pub fn validate_bill(&self, draft: &BillDraft) -> Result<(), ValidationError> {
        if draft.items.is_empty() {
            return Err(ValidationError::NoItems);
        }

        if draft.tax.is_negative() {
            return Err(ValidationError::NegativeTax {
                tax: draft.tax.amount(),
            });
        }
        if draft.tax.amount() > self.config.max_amount {
            return Err(ValidationError::TaxTooLarge {
                tax: draft.tax.amount(),
                max: self.config.max_amount,
            });
        }

        check_text(
            &draft.description,
            TextField::BillDescription,
            self.config.max_bill_description_len,
            false,
        )?;

        for (item_index, item) in draft.items.iter().enumerate() {
            self.validate_item(item_index, item)?;
        }

        Ok(())
    }

    /// Validates a single item line and its assignments
    pub fn validate_item(&self, item_index: usize, item: &ItemDraft) -> Result<(), ValidationError> {
        check_text(
            &item.description,
            TextField::ItemDescription,
            self.config.max_item_description_len,
            true,
        )?;

        if !item.cost.is_positive() {
            return Err(ValidationError::NonPositiveCost {
                item_index,
                cost: item.cost.amount(),
            });
        }
        if item.cost.amount() > self.config.max_amount {
            return Err(ValidationError::CostTooLarge {
                item_index,
                cost: item.cost.amount(),
                max: self.config.max_amount,
            });
        }

        if item.assignments.is_empty() {
            return Err(ValidationError::NoAssignments { item_index });
        }

        let mut total = Decimal::ZERO;
        for (n, assignment) in item.assignments.iter().enumerate() {
            if assignment.fraction <= Decimal::ZERO || assignment.fraction > Decimal::ONE {
                return Err(ValidationError::FractionOutOfRange {
                    item_index,
                    user_id: assignment.user_id,
                    fraction: assignment.fraction,
                });
            }
            if item.assignments[..n].iter().any(|a| a.user_id == assignment.user_id) {
                return Err(ValidationError::DuplicateAssignment {
                    item_index,
                    user_id: assignment.user_id,
                });
            }
            total += assignment.fraction;
        }

        if (total - Decimal::ONE).abs() > self.config.fraction_tolerance {
            return Err(ValidationError::FractionSumMismatch {
                item_index,
                total,
                tolerance: self.config.fraction_tolerance,
            });
        }

        Ok(())
    }
}

impl Default for BillValidator {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

fn check_text(
    value: &str,
    field: TextField,
    max: usize,
    required: bool,
) -> Result<(), ValidationError> {
    if required && value.trim().is_empty() {
        return Err(ValidationError::EmptyText { field });
    }
    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::TextTooLong { field, len, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{Money, UserId};
    use rust_decimal_macros::dec;

    const ALICE: UserId = UserId::new(1);
    const BOB: UserId = UserId::new(2);

    fn pizza() -> ItemDraft {
        ItemDraft::new("Pizza", Money::new(dec!(30)))
            .assign(ALICE, dec!(0.5))
            .assign(BOB, dec!(0.5))
    }

    fn draft(item: ItemDraft) -> BillDraft {
        BillDraft::new(ALICE, "Dinner").item(item)
    }

    #[test]
    fn test_valid_bill() {
        assert!(BillValidator::default().validate_bill(&draft(pizza())).is_ok());
    }

    #[test]
    fn test_fractions_short_of_one_rejected() {
        let item = ItemDraft::new("Pizza", Money::new(dec!(30)))
            .assign(ALICE, dec!(0.4))
            .assign(BOB, dec!(0.4));

        let err = BillValidator::default().validate_bill(&draft(item)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::FractionSumMismatch {
                item_index: 0,
                total: dec!(0.8),
                tolerance: dec!(0.001),
            }
        );
    }

    #[test]
    fn test_fractions_within_tolerance_accepted() {
        let item = ItemDraft::new("Cake", Money::new(dec!(9)))
            .assign(ALICE, dec!(0.333))
            .assign(BOB, dec!(0.333))
            .assign(UserId::new(3), dec!(0.333));

        assert!(BillValidator::default().validate_bill(&draft(item)).is_ok());
    }

    #[test]
    fn test_empty_bill_rejected() {
        let err = BillValidator::default()
            .validate_bill(&BillDraft::new(ALICE, "Nothing"))
            .unwrap_err();
        assert_eq!(err, ValidationError::NoItems);
    }

    #[test]
    fn test_negative_tax_rejected() {
        let bill = draft(pizza()).with_tax(Money::new(dec!(-1)));
        assert!(matches!(
            BillValidator::default().validate_bill(&bill),
            Err(ValidationError::NegativeTax { .. })
        ));
    }

    #[test]
    fn test_zero_cost_rejected() {
        let item = ItemDraft::new("Free", Money::ZERO).assign(ALICE, dec!(1));
        assert!(matches!(
            BillValidator::default().validate_bill(&draft(item)),
            Err(ValidationError::NonPositiveCost { item_index: 0, .. })
        ));
    }

    #[test]
    fn test_item_without_assignments_rejected() {
        let item = ItemDraft::new("Orphan", Money::new(dec!(5)));
        assert_eq!(
            BillValidator::default().validate_bill(&draft(item)),
            Err(ValidationError::NoAssignments { item_index: 0 })
        );
    }

    #[test]
    fn test_fraction_above_one_rejected() {
        let item = ItemDraft::new("Pizza", Money::new(dec!(30))).assign(ALICE, dec!(1.5));
        assert!(matches!(
            BillValidator::default().validate_bill(&draft(item)),
            Err(ValidationError::FractionOutOfRange { .. })
        ));
    }

    #[test]
    fn test_zero_fraction_rejected() {
        let item = ItemDraft::new("Pizza", Money::new(dec!(30)))
            .assign(ALICE, dec!(1))
            .assign(BOB, dec!(0));
        assert!(matches!(
            BillValidator::default().validate_bill(&draft(item)),
            Err(ValidationError::FractionOutOfRange { .. })
        ));
    }

    #[test]
    fn test_oversized_cost_and_tax_rejected() {
        let huge = Decimal::from(1_000_000_000_000_000i64);
        let item = ItemDraft::new("Yacht", Money::new(huge))
            .assign(ALICE, dec!(0.5))
            .assign(BOB, dec!(0.5));
        assert_eq!(
            BillValidator::default().validate_bill(&draft(item)),
            Err(ValidationError::CostTooLarge {
                item_index: 0,
                cost: huge,
                max: dec!(1000000000),
            })
        );

        let taxed = draft(pizza()).with_tax(Money::new(huge));
        assert_eq!(
            BillValidator::default().validate_bill(&taxed),
            Err(ValidationError::TaxTooLarge {
                tax: huge,
                max: dec!(1000000000),
            })
        );
    }

    #[test]
    fn test_amount_at_ceiling_accepted() {
        let item = ItemDraft::new("House", Money::new(dec!(1000000000))).assign(ALICE, dec!(1));
        let bill = draft(item).with_tax(Money::new(dec!(1000000000)));
        assert!(BillValidator::default().validate_bill(&bill).is_ok());
    }

    #[test]
    fn test_duplicate_assignment_rejected() {
        let item = ItemDraft::new("Pizza", Money::new(dec!(30)))
            .assign(ALICE, dec!(0.5))
            .assign(ALICE, dec!(0.5));
        assert_eq!(
            BillValidator::default().validate_bill(&draft(item)),
            Err(ValidationError::DuplicateAssignment {
                item_index: 0,
                user_id: ALICE,
            })
        );
    }

    #[test]
    fn test_blank_item_description_rejected() {
        let item = ItemDraft::new("   ", Money::new(dec!(1))).assign(ALICE, dec!(1));
        assert_eq!(
            BillValidator::default().validate_bill(&draft(item)),
            Err(ValidationError::EmptyText {
                field: TextField::ItemDescription,
            })
        );
    }

    #[test]
    fn test_long_bill_description_rejected() {
        let mut bill = draft(pizza());
        bill.description = "x".repeat(501);
        assert_eq!(
            BillValidator::default().validate_bill(&bill),
            Err(ValidationError::TextTooLong {
                field: TextField::BillDescription,
                len: 501,
                max: 500,
            })
        );
    }

    #[test]
    fn test_empty_bill_description_allowed() {
        let mut bill = draft(pizza());
        bill.description = String::new();
        assert!(BillValidator::default().validate_bill(&bill).is_ok());
    }

    #[test]
    fn test_user_name_rules() {
        let validator = BillValidator::default();
        assert!(validator.validate_user_name("Alice").is_ok());
        assert!(validator.validate_user_name(&"a".repeat(100)).is_ok());
        assert!(matches!(
            validator.validate_user_name(" "),
            Err(ValidationError::EmptyText { field: TextField::UserName })
        ));
        assert!(matches!(
            validator.validate_user_name(&"a".repeat(101)),
            Err(ValidationError::TextTooLong { .. })
        ));
    }

    #[test]
    fn test_configured_tolerance_is_respected() {
        let strict = BillValidator::new(LedgerConfig {
            fraction_tolerance: Decimal::ZERO,
            ..LedgerConfig::default()
        });
        let item = ItemDraft::new("Cake", Money::new(dec!(9)))
            .assign(ALICE, dec!(0.5))
            .assign(BOB, dec!(0.4999));
        assert!(strict.validate_bill(&draft(item)).is_err());
    }
}
