//! HTTP API for receipt settlement.
//!
//! Exposes receipt editing, assignment replacement, settlement and the
//! ledger expense export as JSON endpoints.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{AssignmentsRequest, CreateReceiptRequest, PreviewRequest};
pub use response::{ApiError, ApiErrorResponse, AssignmentsResponse, SettlementsResponse};
pub use state::AppState;
