//! HTTP request handlers for the receipt settlement API.
//!
//! Each handler tags its work with a correlation id, delegates to the
//! workflow layer and maps [`SettleError`] values to JSON error bodies.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::SettleError;
use crate::ledger::build_expense;
use crate::store::{LineItemUpdate, MemberUpdate, NewLineItem, ReceiptUpdate};
use crate::workflow::{self, SettlementInput};

use super::request::{AssignmentsRequest, CreateReceiptRequest, PreviewRequest};
use super::response::{ApiError, ApiErrorResponse, AssignmentsResponse, SettlementsResponse};
use super::state::AppState;

type HandlerResult = Result<Response, ApiErrorResponse>;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/settlements/preview", post(preview_handler))
        .route("/receipts", post(create_receipt_handler))
        .route(
            "/receipts/:id",
            get(get_receipt_handler).patch(update_receipt_handler),
        )
        .route("/receipts/:id/items", post(add_line_item_handler))
        .route(
            "/receipts/:id/items/:item_id",
            patch(update_line_item_handler).delete(delete_line_item_handler),
        )
        .route(
            "/receipts/:id/members/:member_id",
            patch(update_member_handler),
        )
        .route(
            "/receipts/:id/assignments",
            get(get_assignments_handler).put(replace_assignments_handler),
        )
        .route("/receipts/:id/preview", get(preview_receipt_handler))
        .route("/receipts/:id/settle", post(settle_handler))
        .route("/receipts/:id/settlements", get(get_settlements_handler))
        .route("/receipts/:id/expense", get(expense_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

/// Unwraps a JSON body or turns the rejection into a 400 response.
fn parse_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    correlation_id: Uuid,
) -> Result<T, ApiErrorResponse> {
    let rejection = match payload {
        Ok(Json(body)) => return Ok(body),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    Err(ApiErrorResponse::bad_request(error))
}

fn log_failure(
    correlation_id: Uuid,
    operation: &'static str,
) -> impl FnOnce(SettleError) -> ApiErrorResponse {
    move |err| {
        warn!(
            correlation_id = %correlation_id,
            operation = operation,
            error = %err,
            "Request failed"
        );
        err.into()
    }
}

/// Handler for POST /settlements/preview.
///
/// Computes a breakdown for ad-hoc data without touching storage. The data
/// is held to the same amount and share bounds as stored receipts.
async fn preview_handler(
    State(state): State<AppState>,
    payload: Result<Json<PreviewRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing preview request");

    let request = parse_body(payload, correlation_id)?;
    let defaults = state.config().config().defaults();
    let input = SettlementInput {
        line_items: request.line_items,
        assignments: request.assignments,
        tax: request.tax,
        tip: request.tip,
        tax_strategy: request.tax_strategy.unwrap_or(defaults.tax_strategy),
        tip_strategy: request.tip_strategy.unwrap_or(defaults.tip_strategy),
    };
    workflow::validate_input(&input).map_err(log_failure(correlation_id, "preview"))?;

    let start_time = Instant::now();
    let breakdown = input.compute();
    info!(
        correlation_id = %correlation_id,
        members = breakdown.rows.len(),
        grand_total = breakdown.totals.grand_total,
        warnings = breakdown.audit.warnings.len(),
        duration_us = start_time.elapsed().as_micros(),
        "Preview computed"
    );
    Ok(json_response(StatusCode::OK, breakdown))
}

/// Handler for POST /receipts.
async fn create_receipt_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateReceiptRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing create receipt request");

    let request = parse_body(payload, correlation_id)?;
    let receipt = request.into_receipt(state.config().config().defaults());
    let receipt = workflow::create_receipt(state.store(), receipt)
        .map_err(log_failure(correlation_id, "create_receipt"))?;

    Ok(json_response(StatusCode::CREATED, receipt))
}

async fn get_receipt_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let receipt = state
        .store()
        .receipt(&id)
        .map_err(log_failure(correlation_id, "get_receipt"))?;
    Ok(json_response(StatusCode::OK, receipt))
}

async fn update_receipt_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ReceiptUpdate>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, receipt_id = %id, "Processing receipt update");

    let update = parse_body(payload, correlation_id)?;
    let receipt = workflow::update_receipt(state.store(), &id, update)
        .map_err(log_failure(correlation_id, "update_receipt"))?;
    Ok(json_response(StatusCode::OK, receipt))
}

async fn update_line_item_handler(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(String, String)>,
    payload: Result<Json<LineItemUpdate>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    info!(
        correlation_id = %correlation_id,
        receipt_id = %id,
        item_id = %item_id,
        "Processing line item update"
    );

    let update = parse_body(payload, correlation_id)?;
    let item = workflow::update_line_item(state.store(), &id, &item_id, update)
        .map_err(log_failure(correlation_id, "update_line_item"))?;
    Ok(json_response(StatusCode::OK, item))
}

/// Handler for POST /receipts/:id/items.
async fn add_line_item_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<NewLineItem>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, receipt_id = %id, "Processing line item addition");

    let new_item = parse_body(payload, correlation_id)?;
    let item = workflow::add_line_item(state.store(), &id, new_item)
        .map_err(log_failure(correlation_id, "add_line_item"))?;
    Ok(json_response(StatusCode::CREATED, item))
}

/// Handler for DELETE /receipts/:id/items/:item_id.
///
/// Assignments to the deleted item are left for the client to replace.
async fn delete_line_item_handler(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(String, String)>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let item = workflow::delete_line_item(state.store(), &id, &item_id)
        .map_err(log_failure(correlation_id, "delete_line_item"))?;
    Ok(json_response(StatusCode::OK, item))
}

async fn update_member_handler(
    State(state): State<AppState>,
    Path((id, member_id)): Path<(String, String)>,
    payload: Result<Json<MemberUpdate>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    info!(
        correlation_id = %correlation_id,
        receipt_id = %id,
        member_id = %member_id,
        "Processing member update"
    );

    let update = parse_body(payload, correlation_id)?;
    let member = workflow::update_member(state.store(), &id, &member_id, update)
        .map_err(log_failure(correlation_id, "update_member"))?;
    Ok(json_response(StatusCode::OK, member))
}

async fn get_assignments_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let assignments = state
        .store()
        .assignments(&id)
        .map_err(log_failure(correlation_id, "get_assignments"))?;
    Ok(json_response(
        StatusCode::OK,
        AssignmentsResponse { assignments },
    ))
}

/// Handler for PUT /receipts/:id/assignments.
///
/// Replaces the receipt's whole assignment set.
async fn replace_assignments_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<AssignmentsRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, receipt_id = %id, "Processing assignment replacement");

    let request = parse_body(payload, correlation_id)?;
    let assignments = workflow::replace_assignments(state.store(), &id, request.assignments)
        .map_err(log_failure(correlation_id, "replace_assignments"))?;
    Ok(json_response(
        StatusCode::OK,
        AssignmentsResponse { assignments },
    ))
}

async fn preview_receipt_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let breakdown = workflow::preview_receipt(state.store(), &id)
        .map_err(log_failure(correlation_id, "preview_receipt"))?;
    Ok(json_response(StatusCode::OK, breakdown))
}

/// Handler for POST /receipts/:id/settle.
///
/// Computes and persists settlements, replacing any earlier ones.
async fn settle_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, receipt_id = %id, "Processing settle request");

    let settlements = workflow::settle_receipt(state.store(), &id)
        .map_err(log_failure(correlation_id, "settle_receipt"))?;
    info!(
        correlation_id = %correlation_id,
        receipt_id = %id,
        settlements = settlements.len(),
        "Settle request completed"
    );
    Ok(json_response(
        StatusCode::OK,
        SettlementsResponse { settlements },
    ))
}

async fn get_settlements_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let settlements = state
        .store()
        .settlements(&id)
        .map_err(log_failure(correlation_id, "get_settlements"))?;
    Ok(json_response(
        StatusCode::OK,
        SettlementsResponse { settlements },
    ))
}

/// Handler for GET /receipts/:id/expense.
///
/// Builds the shared-expense record a ledger service would receive.
async fn expense_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, receipt_id = %id, "Processing expense export");

    let store = state.store();
    let receipt = store
        .receipt(&id)
        .map_err(log_failure(correlation_id, "expense_export"))?;
    let settlements = store
        .settlements(&id)
        .map_err(log_failure(correlation_id, "expense_export"))?;
    let expense = build_expense(
        &receipt,
        &settlements,
        state.config().config().export(),
        Utc::now().date_naive(),
    )
    .map_err(log_failure(correlation_id, "expense_export"))?;

    info!(
        correlation_id = %correlation_id,
        receipt_id = %id,
        cost = %expense.cost,
        users = expense.users.len(),
        "Expense built"
    );
    Ok(json_response(StatusCode::OK, expense))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use crate::store::InMemoryStore;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn create_test_state() -> AppState {
        let config = ConfigLoader::load("./config/default").expect("Failed to load config");
        AppState::new(config, Arc::new(InMemoryStore::new()))
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_preview_returns_breakdown() {
        let app = create_router(create_test_state());
        let body = json!({
            "line_items": [{ "id": "item_1", "line_total": 1000 }],
            "assignments": [
                { "line_item_id": "item_1", "member_id": "a", "share_numerator": 1, "share_denominator": 1 },
                { "line_item_id": "item_1", "member_id": "b", "share_numerator": 1, "share_denominator": 1 }
            ],
            "tax": 100
        });

        let (status, json) = send(app, "POST", "/settlements/preview", Some(body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["rows"][0]["final_amount"], 550);
        assert_eq!(json["rows"][1]["final_amount"], 550);
        assert_eq!(json["totals"]["grand_total"], 1100);
    }

    #[tokio::test]
    async fn test_preview_malformed_json() {
        let app = create_router(create_test_state());
        let request = Request::builder()
            .method("POST")
            .uri("/settlements/preview")
            .header("Content-Type", "application/json")
            .body(Body::from("{ not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["code"], "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_preview_missing_field_is_validation_error() {
        let app = create_router(create_test_state());
        let (status, json) = send(
            app,
            "POST",
            "/settlements/preview",
            Some(json!({ "line_items": [] })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_preview_rejects_amounts_that_could_overflow() {
        let app = create_router(create_test_state());
        let body = json!({
            "line_items": [
                { "id": "item_1", "line_total": 4611686018427387904i64 },
                { "id": "item_2", "line_total": 4611686018427387904i64 }
            ],
            "assignments": [
                { "line_item_id": "item_1", "member_id": "a", "share_numerator": 1, "share_denominator": 1 },
                { "line_item_id": "item_2", "member_id": "a", "share_numerator": 1, "share_denominator": 1 }
            ]
        });

        let (status, json) = send(app, "POST", "/settlements/preview", Some(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "INVALID_LINE_ITEM");
    }

    #[tokio::test]
    async fn test_preview_rejects_negative_share() {
        let app = create_router(create_test_state());
        let body = json!({
            "line_items": [{ "id": "item_1", "line_total": 1000 }],
            "assignments": [
                { "line_item_id": "item_1", "member_id": "a", "share_numerator": 3, "share_denominator": 1 },
                { "line_item_id": "item_1", "member_id": "b", "share_numerator": -1, "share_denominator": 1 }
            ]
        });

        let (status, json) = send(app, "POST", "/settlements/preview", Some(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "INVALID_ASSIGNMENT");
    }

    #[tokio::test]
    async fn test_missing_content_type() {
        let app = create_router(create_test_state());
        let request = Request::builder()
            .method("POST")
            .uri("/settlements/preview")
            .body(Body::from("{}"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_receipt_is_404() {
        let app = create_router(create_test_state());
        let (status, json) = send(app, "GET", "/receipts/missing", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "RECEIPT_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_create_receipt_returns_201() {
        let app = create_router(create_test_state());
        let body = json!({
            "payer_id": "a",
            "members": [{ "id": "a", "name": "Ann" }],
            "line_items": [{ "name": "Soup", "line_total": 900 }]
        });

        let (status, json) = send(app, "POST", "/receipts", Some(body)).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["status"], "REVIEW");
        assert_eq!(json["line_items"][0]["id"], "item_1");
    }

    #[tokio::test]
    async fn test_create_receipt_rejects_negative_tax() {
        let app = create_router(create_test_state());
        let body = json!({
            "members": [],
            "line_items": [],
            "tax": -5
        });

        let (status, json) = send(app, "POST", "/receipts", Some(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "INVALID_AMOUNT");
    }

    #[tokio::test]
    async fn test_add_and_delete_line_item() {
        let app = create_router(create_test_state());
        let body = json!({
            "members": [{ "id": "a", "name": "Ann" }],
            "line_items": [{ "name": "Soup", "line_total": 900 }]
        });
        let (_, receipt) = send(app.clone(), "POST", "/receipts", Some(body)).await;
        let id = receipt["id"].as_str().unwrap().to_string();

        let (status, item) = send(
            app.clone(),
            "POST",
            &format!("/receipts/{}/items", id),
            Some(json!({ "name": "Bread", "line_total": 300 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(item["id"], "item_2");
        assert_eq!(item["sort_order"], 1);

        let (status, _) = send(
            app.clone(),
            "DELETE",
            &format!("/receipts/{}/items/item_1", id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, json) = send(
            app,
            "DELETE",
            &format!("/receipts/{}/items/item_1", id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "LINE_ITEM_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_update_unknown_member_is_400() {
        let app = create_router(create_test_state());
        let body = json!({
            "members": [{ "id": "a", "name": "Ann" }],
            "line_items": []
        });
        let (_, receipt) = send(app.clone(), "POST", "/receipts", Some(body)).await;
        let id = receipt["id"].as_str().unwrap().to_string();

        let (status, json) = send(
            app,
            "PATCH",
            &format!("/receipts/{}/members/zed", id),
            Some(json!({ "ledger_user_id": 5 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "UNKNOWN_MEMBER");
    }
}
