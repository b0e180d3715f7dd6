// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Static browser pages around the OAuth flow.

use axum::{response::Html, routing::get, Router};
use std::sync::Arc;

use super::auth::{AUTH_PATH, SUCCESS_PATH};
use crate::render::{render_auth_success, render_home};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(home))
        .route(SUCCESS_PATH, get(auth_success))
}

async fn home() -> Html<String> {
    Html(render_home(AUTH_PATH))
}

async fn auth_success() -> Html<String> {
    Html(render_auth_success())
}
