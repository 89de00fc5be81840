//! External ledger export.
//!
//! Builds the expense record an external shared-expense ledger expects from
//! a settled receipt. Delivering the record is left to the caller.

mod export;

pub use export::{ExpenseRecord, ExpenseShare, build_expense, format_cents};
