// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Token exchange or refresh was rejected, or never reached WHOOP.
    #[error("WHOOP authorization error: {0}")]
    Auth(String),

    /// A dashboard data request to WHOOP failed.
    #[error("WHOOP API error: {0}")]
    Upstream(String),

    /// The token store backend is unavailable or returned bad data.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Marker embedded in upstream errors caused by a rejected access token.
    pub const WHOOP_TOKEN_ERROR: &'static str = "WHOOP access token rejected (401)";

    /// Marker embedded in upstream errors caused by rate limiting.
    pub const WHOOP_RATE_LIMIT: &'static str = "WHOOP rate limit exceeded (429)";

    /// Whether this error came from WHOOP rejecting the bearer token.
    pub fn is_whoop_token_error(&self) -> bool {
        matches!(self, AppError::Upstream(msg) if msg.contains(Self::WHOOP_TOKEN_ERROR))
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Auth(msg) => {
                tracing::error!(error = %msg, "WHOOP authorization failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to authenticate with WHOOP".to_string(),
                    None,
                )
            }
            AppError::Upstream(msg) => (
                StatusCode::BAD_GATEWAY,
                "whoop_error".to_string(),
                Some(msg.clone()),
            ),
            AppError::Storage(msg) => {
                tracing::error!(error = %msg, "Storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "storage_error".to_string(),
                    None,
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse { error, details };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
