//! Response types for the receipt settlement API.
//!
//! This module defines the success envelopes and the error response
//! structures for the HTTP API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::SettleError;
use crate::models::{Assignment, SettlementRecord};

/// Envelope for assignment lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentsResponse {
    /// The receipt's assignments in stored order.
    pub assignments: Vec<Assignment>,
}

/// Envelope for stored settlement records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementsResponse {
    /// The receipt's settlement records.
    pub settlements: Vec<SettlementRecord>,
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response carrying `error`.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<SettleError> for ApiErrorResponse {
    fn from(error: SettleError) -> Self {
        let message = error.to_string();
        let (status, error) = match error {
            SettleError::ConfigNotFound { .. } | SettleError::ConfigParseError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            ),
            SettleError::ReceiptNotFound { .. } => (
                StatusCode::NOT_FOUND,
                ApiError::new("RECEIPT_NOT_FOUND", message),
            ),
            SettleError::LineItemNotFound { .. } => (
                StatusCode::NOT_FOUND,
                ApiError::new("LINE_ITEM_NOT_FOUND", message),
            ),
            SettleError::InvalidLineItem { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_LINE_ITEM", message),
            ),
            SettleError::InvalidAmount { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_AMOUNT", message),
            ),
            SettleError::InvalidAssignment { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_ASSIGNMENT", message),
            ),
            SettleError::UnknownMember { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("UNKNOWN_MEMBER", message),
            ),
            SettleError::InvalidMember { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_MEMBER", message),
            ),
            SettleError::ManualSplitMismatch { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("MANUAL_SPLIT_MISMATCH", message),
            ),
            SettleError::NoPayer => (
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "NO_PAYER",
                    message,
                    "Set a payer before settling or exporting",
                ),
            ),
            SettleError::NoAssignments => (
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "NO_ASSIGNMENTS",
                    message,
                    "Split items among members before settling",
                ),
            ),
            SettleError::NoValidLineItems => (
                StatusCode::BAD_REQUEST,
                ApiError::new("NO_VALID_LINE_ITEMS", message),
            ),
            SettleError::ReceiptNotSettled { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("RECEIPT_NOT_SETTLED", message),
            ),
            SettleError::NoSettlements => (
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "NO_SETTLEMENTS",
                    message,
                    "Compute the settlement before exporting",
                ),
            ),
            SettleError::UnmappedMembers { names } => (
                StatusCode::BAD_REQUEST,
                ApiError::with_details("UNMAPPED_MEMBERS", message, names.join(", ")),
            ),
            SettleError::Storage { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("STORAGE_ERROR", "Storage failure", message),
            ),
        };
        ApiErrorResponse { status, error }
    }
}
