//! Core data models for the receipt settlement system.
//!
//! This module contains the engine's inputs and outputs along with the
//! stored receipt records that surround them.

mod assignment;
mod line_item;
mod receipt;
mod settlement;
mod strategy;

pub use assignment::Assignment;
pub use line_item::{LineItem, ReceiptLineItem};
pub use receipt::{Member, Receipt, ReceiptStatus, SettlementRecord};
pub use settlement::{
    AuditStep, AuditTrace, AuditWarning, SettlementBreakdown, SettlementRow, SettlementTotals,
};
pub use strategy::{AllocationMode, Strategy};

/// An amount of money in integer minor currency units (e.g. cents).
pub type Cents = i64;

/// Upper bound on the combined line totals, tax and tip of one receipt.
///
/// Amounts inside this bound can be summed per member and across members
/// without leaving `i64`.
pub const MAX_RECEIPT_AMOUNT: Cents = 1_000_000_000_000_000;
