// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! WHOOP-TRMNL Server
//!
//! Serves WHOOP recovery data as an HTML snapshot for a polling
//! TRMNL e-ink display.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use whoop_trmnl::{
    config::{Config, StoreBackend},
    db::{FirestoreKv, KvStore, MemoryKv, TokenStore},
    services::{WhoopClient, WhoopService},
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        user_id = %config.user_id,
        "Starting WHOOP-TRMNL"
    );

    // Token store backend
    let kv: Arc<dyn KvStore> = match config.token_store {
        StoreBackend::Firestore => Arc::new(FirestoreKv::new(&config.gcp_project_id).await?),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory token store; tokens are lost on restart");
            Arc::new(MemoryKv::new())
        }
    };
    let store = TokenStore::new(kv);

    // Shared per-user refresh locks
    let refresh_locks = Arc::new(dashmap::DashMap::new());

    let client = WhoopClient::new(&config)?;
    tracing::info!(
        redirect_uri = %config.redirect_uri(),
        timeout_secs = config.upstream_timeout.as_secs(),
        "WHOOP client initialized"
    );

    let whoop = WhoopService::new(client, store, refresh_locks);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        whoop,
    });

    // Build router
    let app = whoop_trmnl::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("whoop_trmnl=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
