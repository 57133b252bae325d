//! HTTP request handlers for the gateway.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};
use tracing::{info, warn};
use uuid::Uuid;

use crate::sync::{SyncAction, SyncRequest};

use super::auth::{authenticate, authorize};
use super::request::ActionQuery;
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/sync", get(sync_get_handler).post(sync_post_handler))
        .with_state(state)
}

/// Handler for GET /health.
async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Handler for GET /sync. Only body-less actions succeed here.
async fn sync_get_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<ActionQuery>, QueryRejection>,
) -> Response {
    dispatch(state, headers, query, Ok(Value::Null)).await
}

/// Handler for POST /sync.
async fn sync_post_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<ActionQuery>, QueryRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let body = payload.map(|Json(value)| value).map_err(json_rejection);
    dispatch(state, headers, query, body).await
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(err) => ApiError::malformed_json(err.body_text()),
        JsonRejection::JsonSyntaxError(err) => {
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    }
}

/// Authenticates, validates and executes one gateway call.
///
/// Caller identity is checked before the action is even parsed, and the
/// administrator guard runs before any upstream work.
async fn dispatch(
    state: AppState,
    headers: HeaderMap,
    query: Result<Query<ActionQuery>, QueryRejection>,
    body: Result<Value, ApiError>,
) -> Response {
    // Generate correlation ID for request tracking
    let correlation_id = Uuid::new_v4();

    let caller = match authenticate(state.verifier(), &headers).await {
        Ok(caller) => caller,
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Caller rejected");
            return ApiErrorResponse::from(err).into_response();
        }
    };

    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            warn!(correlation_id = %correlation_id, error = %rejection, "Invalid query string");
            return ApiErrorResponse::bad_request(ApiError::validation_error(rejection.body_text()))
                .into_response();
        }
    };

    let action: SyncAction = match query.action.parse() {
        Ok(action) => action,
        Err(err) => return ApiErrorResponse::from(err).into_response(),
    };

    if let Err(err) = authorize(&caller, action, query.refresh) {
        warn!(
            correlation_id = %correlation_id,
            caller = %caller.id,
            action = %action,
            refresh = query.refresh,
            "Caller lacks administrator privilege"
        );
        return ApiErrorResponse::from(err).into_response();
    }

    let body = match (action, body) {
        (SyncAction::ListEmployees, _) => Value::Null,
        (_, Ok(body)) => body,
        (_, Err(error)) => {
            warn!(correlation_id = %correlation_id, error = %error.error, "Unreadable request body");
            return ApiErrorResponse::bad_request(error).into_response();
        }
    };

    let request = match SyncRequest::parse(action, body) {
        Ok(request) => request,
        Err(err) => {
            warn!(correlation_id = %correlation_id, action = %action, error = %err, "Invalid parameters");
            return ApiErrorResponse::from(err).into_response();
        }
    };

    info!(
        correlation_id = %correlation_id,
        caller = %caller.id,
        action = %action,
        refresh = query.refresh,
        "Processing sync request"
    );

    let start_time = Instant::now();
    match state
        .service()
        .execute(request, query.refresh, &caller.id)
        .await
    {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                action = %action,
                duration_ms = start_time.elapsed().as_millis(),
                "Sync request completed"
            );
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                Json(result),
            )
                .into_response()
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                action = %action,
                error = %err,
                "Sync request failed"
            );
            ApiErrorResponse::from(err).into_response()
        }
    }
}
