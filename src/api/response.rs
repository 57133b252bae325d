//! Response types for the gateway.
//!
//! This module defines the error envelope and the mapping from
//! [`EngineError`] onto HTTP statuses.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable error message.
    pub error: String,
    /// Error code for programmatic handling.
    pub code: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: code.into(),
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
            error: message.into(),
            code: code.into(),
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
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A `400 Bad Request` carrying `error`.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(self.error),
        )
            .into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let description = error.to_string();
        let (status, error) = match error {
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::Config { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", "Configuration error", description),
            ),
            EngineError::Auth { message } => {
                (StatusCode::UNAUTHORIZED, ApiError::new("UNAUTHORIZED", message))
            }
            EngineError::Authorization { message } => {
                (StatusCode::FORBIDDEN, ApiError::new("FORBIDDEN", message))
            }
            EngineError::Upstream { message } => (
                StatusCode::BAD_GATEWAY,
                ApiError::with_details("UPSTREAM_ERROR", "Upstream provider call failed", message),
            ),
            EngineError::Persistence { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("PERSISTENCE_ERROR", "Failed to persist totals", message),
            ),
            EngineError::Cache { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CACHE_ERROR", "Cache unavailable", message),
            ),
            EngineError::Validation { message } => {
                (StatusCode::BAD_REQUEST, ApiError::validation_error(message))
            }
        };
        Self { status, error }
    }
}
