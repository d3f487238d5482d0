//! Bills Domain - Itemized Shared Expenses
//!
//! This crate records who paid for what and computes each participant's
//! exact share of a bill.
//!
//! # Bill Model
//!
//! - A **bill** is fronted by one payer and carries a tax/fee amount
//! - Each **item** on the bill has a positive cost
//! - Each item is divided between users by **assignments**, whose fractions
//!   sum to one (within a configured tolerance)
//!
//! Bills, items and assignments are written together as one unit and never
//! change afterwards.
//!
//! # Share Calculation
//!
//! A user's share is the cost of their fractions of each item plus a slice
//! of the tax proportional to that subtotal. See [`share`] for the formula.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_bills::{BillDraft, ItemDraft, BillService};
//! use rust_decimal_macros::dec;
//!
//! let draft = BillDraft::new(alice.id, "Pizza night")
//!     .item(ItemDraft::new("Pizza", Money::new(dec!(30.00)))
//!         .assign(alice.id, dec!(0.5))
//!         .assign(bob.id, dec!(0.5)));
//!
//! let record = bill_service.create_bill(&draft)?;
//! let bob_owes = bill_service.calculate_user_share(record.bill.id, bob.id)?;
//! ```

pub mod user;
pub mod bill;
pub mod draft;
pub mod validation;
pub mod share;
pub mod ports;
pub mod services;
pub mod error;

pub use user::User;
pub use bill::{Bill, Item, Assignment, ItemWithAssignments, BillRecord};
pub use draft::{BillDraft, ItemDraft, AssignmentDraft};
pub use validation::BillValidator;
pub use share::ShareCalculator;
pub use ports::{UserStore, BillStore, BalanceLookup};
pub use services::{BillService, UserService, BillPreview, BillDetail, ParticipantShare};
pub use error::{BillError, ValidationError, TextField};
