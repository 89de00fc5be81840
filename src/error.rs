//! Error types for the receipt settlement system.
//!
//! The allocation engine itself never fails; every variant here comes from
//! the layers around it: configuration, storage, workflow preconditions,
//! assignment validation and ledger export validation.

use thiserror::Error;

use crate::models::{Cents, ReceiptStatus};

/// The main error type for the receipt settlement system.
///
/// # Example
///
/// ```
/// use receipt_split::error::SettleError;
///
/// let error = SettleError::ReceiptNotFound {
///     id: "rcpt_001".to_string(),
/// };
/// assert_eq!(error.to_string(), "Receipt not found: rcpt_001");
/// ```
#[derive(Debug, Error)]
pub enum SettleError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// No receipt exists with the given identifier.
    #[error("Receipt not found: {id}")]
    ReceiptNotFound {
        /// The receipt identifier that was looked up.
        id: String,
    },

    /// The receipt has no line item with the given identifier.
    #[error("Line item '{item_id}' not found on receipt '{receipt_id}'")]
    LineItemNotFound {
        /// The receipt that was searched.
        receipt_id: String,
        /// The missing line item identifier.
        item_id: String,
    },

    /// A line item carried invalid data.
    #[error("Invalid line item '{item_id}': {message}")]
    InvalidLineItem {
        /// The offending line item.
        item_id: String,
        /// What made it invalid.
        message: String,
    },

    /// A receipt-level amount (tax, tip, total) was out of range.
    #[error("Invalid amount for '{field}': {message}")]
    InvalidAmount {
        /// The field that was invalid.
        field: String,
        /// What made it invalid.
        message: String,
    },

    /// An assignment row failed validation.
    #[error("Invalid assignment of line item '{line_item_id}' to member '{member_id}': {message}")]
    InvalidAssignment {
        /// The line item the assignment references.
        line_item_id: String,
        /// The member the assignment references.
        member_id: String,
        /// What made it invalid.
        message: String,
    },

    /// A member id does not belong to the receipt's group.
    #[error("Unknown member: {member_id}")]
    UnknownMember {
        /// The unrecognised member identifier.
        member_id: String,
    },

    /// A member update carried invalid data.
    #[error("Invalid member '{member_id}': {message}")]
    InvalidMember {
        /// The member being updated.
        member_id: String,
        /// What made it invalid.
        message: String,
    },

    /// Exact-amount shares of a line item do not add up to its total.
    #[error("Manual split of line item '{line_item_id}' sums to {actual}, expected {expected}")]
    ManualSplitMismatch {
        /// The line item being split.
        line_item_id: String,
        /// The line item total.
        expected: Cents,
        /// The sum of the supplied amounts.
        actual: Cents,
    },

    /// Settling or exporting requires a payer.
    #[error("No payer set for this receipt")]
    NoPayer,

    /// Settling requires at least one assignment.
    #[error("No item assignments found for this receipt")]
    NoAssignments,

    /// Settling requires at least one valid line item.
    #[error("No valid line items found for this receipt")]
    NoValidLineItems,

    /// Exporting requires a settled receipt.
    #[error("Receipt must be settled before exporting (status: {status})")]
    ReceiptNotSettled {
        /// The receipt's current status.
        status: ReceiptStatus,
    },

    /// Exporting requires stored settlement records.
    #[error("No settlements found for this receipt")]
    NoSettlements,

    /// Some members have no external ledger account mapping.
    #[error("Members not mapped to a ledger account: {}", names.join(", "))]
    UnmappedMembers {
        /// Display names of the unmapped members.
        names: Vec<String>,
    },

    /// The storage backend failed.
    #[error("Storage error: {message}")]
    Storage {
        /// A description of the failure.
        message: String,
    },
}

/// A type alias for Results that return SettleError.
pub type SettleResult<T> = Result<T, SettleError>;
