// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! WHOOP API client and token lifecycle.
//!
//! Handles:
//! - OAuth authorization URL, code exchange and token refresh
//! - Cycle, recovery and sleep reads for the dashboard
//! - Refresh-on-demand of expired tokens, serialized per user

use crate::config::Config;
use crate::error::AppError;
use crate::models::whoop::Collection;
use crate::models::{
    Cycle, DashboardData, Recovery, RecoverySample, SleepRecord, SleepSample, TokenResponse,
};
use crate::time_utils::format_utc_rfc3339;
use chrono::{Duration, Utc};
use serde::Deserialize;

/// OAuth scopes requested from WHOOP.
pub const SCOPES: [&str; 4] = ["read:cycles", "read:recovery", "read:sleep", "read:hrv"];

/// Trailing window for cycle queries.
const CYCLE_WINDOW_DAYS: i64 = 7;
/// Number of cycles feeding the HRV trend.
const HISTORY_LIMIT: u32 = 7;
/// Trailing window for the latest sleep.
const SLEEP_WINDOW_HOURS: i64 = 24;
/// Sleeps requested per lookup, enough to see past a few naps.
const SLEEP_PAGE_LIMIT: u32 = 5;

/// WHOOP API client.
#[derive(Clone)]
pub struct WhoopClient {
    http: reqwest::Client,
    base_url: String,
    auth_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl WhoopClient {
    /// Create a client from configuration. Every request carries the
    /// configured timeout.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client init failed: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.whoop_api_base_url.clone(),
            auth_url: config.whoop_auth_url.clone(),
            token_url: config.whoop_token_url.clone(),
            client_id: config.whoop_client_id.clone(),
            client_secret: config.whoop_client_secret.clone(),
            redirect_uri: config.redirect_uri(),
        })
    }

    // ─── OAuth ───────────────────────────────────────────────────────────────

    /// URL the user visits to grant access. Deterministic for a given config.
    pub fn authorization_url(&self) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}",
            self.auth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&SCOPES.join(" ")),
        )
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AppError> {
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
        ])
        .await
    }

    /// Refresh an expired access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, AppError> {
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ])
        .await
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(form)
            .send()
            .await
            .map_err(|e| AppError::Auth(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "WHOOP token request rejected");
            return Err(AppError::Auth(format!(
                "Token request failed with status {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Auth(format!("Failed to parse token response: {}", e)))
    }

    // ─── Data Reads ──────────────────────────────────────────────────────────

    /// Most recent cycle in the trailing week.
    pub async fn latest_cycle(&self, access_token: &str) -> Result<Cycle, AppError> {
        self.recent_cycles(access_token, 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Upstream("No cycles in the last 7 days".to_string()))
    }

    /// Recovery for one cycle, fetched directly.
    pub async fn cycle_recovery(
        &self,
        access_token: &str,
        cycle_id: i64,
    ) -> Result<Recovery, AppError> {
        self.get_json(&format!("/cycle/{}/recovery", cycle_id), access_token, &[])
            .await
    }

    /// Scored recoveries of up to seven recent cycles, oldest first.
    pub async fn recovery_history(
        &self,
        access_token: &str,
    ) -> Result<Vec<RecoverySample>, AppError> {
        let cycles = self.recent_cycles(access_token, HISTORY_LIMIT).await?;

        // WHOOP returns newest first.
        let mut samples: Vec<RecoverySample> =
            cycles.iter().filter_map(Cycle::recovery_sample).collect();
        samples.reverse();
        Ok(samples)
    }

    /// Most recent scored main sleep in the trailing day. Naps are
    /// skipped; WHOOP already folds them into the sleep need.
    pub async fn latest_sleep(&self, access_token: &str) -> Result<SleepSample, AppError> {
        let start = Utc::now() - Duration::hours(SLEEP_WINDOW_HOURS);
        let page: Collection<SleepRecord> = self
            .get_json(
                "/activity/sleep",
                access_token,
                &[
                    ("start", format_utc_rfc3339(start)),
                    ("limit", SLEEP_PAGE_LIMIT.to_string()),
                ],
            )
            .await?;

        let sleep = page
            .records
            .into_iter()
            .find(|s| !s.nap)
            .ok_or_else(|| AppError::Upstream("No sleep in the last 24 hours".to_string()))?;

        sleep
            .sample()
            .ok_or_else(|| AppError::Upstream(format!("Sleep {} is not scored yet", sleep.id)))
    }

    /// Everything the dashboard needs, fetched concurrently. Any failure
    /// fails the whole aggregate.
    pub async fn fetch_all(&self, access_token: &str) -> Result<DashboardData, AppError> {
        let (cycle, hrv_history, sleep) = tokio::try_join!(
            self.latest_cycle(access_token),
            self.recovery_history(access_token),
            self.latest_sleep(access_token),
        )?;

        let recovery = match cycle.recovery_sample() {
            Some(sample) => sample,
            None => {
                tracing::debug!(cycle_id = cycle.id, "Recovery not embedded, fetching");
                self.cycle_recovery(access_token, cycle.id)
                    .await?
                    .sample()
                    .ok_or_else(|| {
                        AppError::Upstream(format!(
                            "Recovery for cycle {} is not scored yet",
                            cycle.id
                        ))
                    })?
            }
        };

        Ok(DashboardData {
            cycle,
            recovery,
            hrv_history,
            sleep,
        })
    }

    async fn recent_cycles(&self, access_token: &str, limit: u32) -> Result<Vec<Cycle>, AppError> {
        let end = Utc::now();
        let start = end - Duration::days(CYCLE_WINDOW_DAYS);
        let page: Collection<Cycle> = self
            .get_json(
                "/cycle",
                access_token,
                &[
                    ("start", format_utc_rfc3339(start)),
                    ("end", format_utc_rfc3339(end)),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Ok(page.records)
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        access_token: &str,
        query: &[(&str, String)],
    ) -> Result<T, AppError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("GET {} failed: {}", path, e)))?;

        self.check_response_json(response).await
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("WHOOP rate limit hit (429)");
                return Err(AppError::Upstream(AppError::WHOOP_RATE_LIMIT.to_string()));
            }

            if status.as_u16() == 401 {
                return Err(AppError::Upstream(AppError::WHOOP_TOKEN_ERROR.to_string()));
            }

            return Err(AppError::Upstream(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("JSON parse error: {}", e)))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// WhoopService - token lifecycle on top of the client
// ─────────────────────────────────────────────────────────────────────────────

use crate::db::TokenStore;
use crate::models::{TokenRecord, TokenState};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared per-user refresh locks.
pub type RefreshLocks = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// High-level WHOOP service: owns the client and the token store and
/// hands out usable access tokens.
#[derive(Clone)]
pub struct WhoopService {
    client: WhoopClient,
    store: TokenStore,
    /// Per-user mutex to serialize token refresh operations.
    refresh_locks: RefreshLocks,
}

impl WhoopService {
    pub fn new(client: WhoopClient, store: TokenStore, refresh_locks: RefreshLocks) -> Self {
        Self {
            client,
            store,
            refresh_locks,
        }
    }

    pub fn client(&self) -> &WhoopClient {
        &self.client
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    // ─── OAuth Callback Handling ─────────────────────────────────────────────

    /// Exchange the code, store the token record and record the login.
    pub async fn handle_oauth_callback(
        &self,
        user_id: &str,
        code: &str,
    ) -> Result<TokenRecord, AppError> {
        let tokens = self.client.exchange_code(code).await?;
        let now = Utc::now();
        let record = TokenRecord::issued_at(
            tokens.access_token,
            tokens.refresh_token,
            tokens.expires_in,
            now,
        );

        self.store.set(user_id, &record).await?;

        if let Err(e) = self.store.record_login(user_id, now).await {
            tracing::warn!(error = %e, user_id, "Failed to store user profile, continuing anyway");
        }

        tracing::info!(user_id, expires_at = record.expires_at, "WHOOP tokens stored");
        Ok(record)
    }

    // ─── Token Management ────────────────────────────────────────────────────

    /// Access token usable right now, or `None` when the user must
    /// (re)authorize: no record, or the refresh was rejected.
    ///
    /// A failed refresh leaves the stale record in place so the next
    /// request tries again. Storage failures are errors.
    pub async fn valid_access_token(&self, user_id: &str) -> Result<Option<String>, AppError> {
        let record = self.store.get(user_id).await?;
        match TokenRecord::state(record.as_ref(), Utc::now()) {
            TokenState::Unauthorized => return Ok(None),
            TokenState::Valid => return Ok(record.map(|r| r.access_token)),
            TokenState::Expired => {}
        }

        // Only one task per user performs the refresh; others wait here.
        let lock = self
            .refresh_locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Another task may have refreshed while we were waiting.
        let record = match self.store.get(user_id).await? {
            Some(r) => r,
            None => return Ok(None),
        };
        if !record.is_expired(Utc::now()) {
            return Ok(Some(record.access_token));
        }

        tracing::info!(user_id, "Access token expired, refreshing");

        let tokens = match self.client.refresh(&record.refresh_token).await {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(error = %e, user_id, "Token refresh failed, authorization required");
                return Ok(None);
            }
        };

        let refreshed = TokenRecord::issued_at(
            tokens.access_token,
            tokens.refresh_token,
            tokens.expires_in,
            Utc::now(),
        );
        self.store.set(user_id, &refreshed).await?;

        tracing::info!(user_id, "Token refreshed");
        Ok(Some(refreshed.access_token))
    }
}
