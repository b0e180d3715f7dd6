// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! WHOOP-TRMNL: WHOOP recovery metrics on an e-ink display
//!
//! This crate connects a WHOOP account over OAuth, fetches recovery,
//! HRV and sleep data, and serves them as a fixed-size HTML page that
//! a TRMNL display polls.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod render;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::WhoopService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub whoop: WhoopService,
}
