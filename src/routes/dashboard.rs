// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dashboard endpoint polled by the e-ink display.
//!
//! Always answers 200 with an HTML document: the dashboard, the
//! authorization prompt, or an error page. The display cannot show
//! anything for non-200 responses.

use axum::{extract::State, response::Html, routing::get, Router};
use std::sync::Arc;

use crate::error::Result;
use crate::models::DashboardView;
use crate::render::{render_auth_prompt, render_dashboard, render_error};
use crate::services::{dashboard, WhoopService};
use crate::AppState;

const FETCH_ERROR_MESSAGE: &str = "Error fetching WHOOP data";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/dashboard", get(get_dashboard))
}

async fn get_dashboard(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(dashboard_page(&state, &state.config.user_id).await)
}

/// Render the page for `user_id`. Never fails.
pub async fn dashboard_page(state: &AppState, user_id: &str) -> String {
    match load_dashboard(&state.whoop, user_id).await {
        Ok(Some(view)) => render_dashboard(&view),
        Ok(None) => render_auth_prompt(&state.whoop.client().authorization_url()),
        Err(e) => {
            if e.is_whoop_token_error() {
                tracing::warn!(
                    user_id,
                    "WHOOP rejected the stored access token, re-authorization may be needed"
                );
            } else {
                tracing::error!(error = %e, user_id, "Error generating dashboard");
            }
            let detail = e.to_string();
            render_error(
                FETCH_ERROR_MESSAGE,
                state.config.expose_error_details.then_some(detail.as_str()),
            )
        }
    }
}

/// `None` when the user has to authorize first.
async fn load_dashboard(whoop: &WhoopService, user_id: &str) -> Result<Option<DashboardView>> {
    let Some(access_token) = whoop.valid_access_token(user_id).await? else {
        tracing::info!(user_id, "No usable WHOOP token, showing authorization prompt");
        return Ok(None);
    };

    let data = whoop.client().fetch_all(&access_token).await?;
    tracing::debug!(
        user_id,
        cycle_id = data.cycle.id,
        history = data.hrv_history.len(),
        "WHOOP data fetched"
    );

    Ok(Some(dashboard::build(
        &data.recovery,
        &data.hrv_history,
        &data.sleep,
    )))
}
