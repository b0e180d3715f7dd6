// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! WHOOP OAuth authentication routes.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::config::CALLBACK_PATH;
use crate::error::{AppError, Result};
use crate::AppState;

/// Entry point of the OAuth flow.
pub const AUTH_PATH: &str = "/api/auth";
/// Where the browser lands after a successful callback.
pub const SUCCESS_PATH: &str = "/auth/success";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(AUTH_PATH, get(auth_start))
        .route(CALLBACK_PATH, get(auth_callback))
}

/// 302 Found to `location`.
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// Start OAuth flow - redirect to WHOOP authorization.
async fn auth_start(State(state): State<Arc<AppState>>) -> Response {
    let auth_url = state.whoop.client().authorization_url();

    tracing::info!(
        client_id = %state.config.whoop_client_id,
        "Starting OAuth flow, redirecting to WHOOP"
    );

    found(&auth_url)
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// OAuth callback - exchange code for tokens and store them.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Response> {
    if let Some(error) = &params.error {
        tracing::warn!(
            error = %error,
            description = params.error_description.as_deref().unwrap_or(""),
            "OAuth error from WHOOP"
        );
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("No authorization code provided".to_string()))?;

    tracing::info!("Exchanging authorization code for tokens");

    let user_id = &state.config.user_id;
    state
        .whoop
        .handle_oauth_callback(user_id, &code)
        .await
        .map_err(|e| match e {
            // The browser sees one failure for the whole exchange-and-store step.
            AppError::Storage(msg) => AppError::Auth(format!("Failed to store tokens: {}", msg)),
            other => other,
        })?;

    tracing::info!(user_id = %user_id, "OAuth successful");

    Ok(found(SUCCESS_PATH))
}
