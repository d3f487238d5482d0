//! Strongly-typed identifiers for ledger records
//!
//! Stores assign numeric identities on insert. Newtype wrappers keep a
//! `UserId` from being passed where a `BillId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw store identifier
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Returns the raw store identifier
            pub const fn value(&self) -> i64 {
                self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Strip prefix if present
                let raw = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Ok(Self(raw.parse()?))
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }
    };
}

define_id!(UserId, "USR");
define_id!(BillId, "BIL");
define_id!(ItemId, "ITM");
define_id!(AssignmentId, "ASG");
define_id!(SettlementId, "STL");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_display() {
        assert_eq!(UserId::new(7).to_string(), "USR-7");
    }

    #[test]
    fn test_id_parsing() {
        let original = BillId::new(42);
        let parsed: BillId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);

        let bare: BillId = "42".parse().unwrap();
        assert_eq!(bare, original);
    }

    #[test]
    fn test_ids_order_numerically() {
        assert!(UserId::new(2) < UserId::new(10));
    }

    #[test]
    fn test_serializes_as_integer() {
        let json = serde_json::to_string(&SettlementId::new(3)).unwrap();
        assert_eq!(json, "3");
    }
}
