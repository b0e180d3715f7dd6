// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Token store: one token record and one profile per user id.
//!
//! Records are stored as JSON strings under `whoop:token:<id>` and
//! `whoop:user:<id>`. The store does not judge expiry; callers do.

use super::{keys, KvStore};
use crate::error::AppError;
use crate::models::{TokenRecord, UserRecord};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

#[derive(Clone)]
pub struct TokenStore {
    kv: Arc<dyn KvStore>,
}

impl TokenStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    // ─── Token Operations ────────────────────────────────────────

    pub async fn get(&self, user_id: &str) -> Result<Option<TokenRecord>, AppError> {
        self.get_json(&keys::token(user_id)).await
    }

    /// Store (or overwrite) the user's token record.
    pub async fn set(&self, user_id: &str, record: &TokenRecord) -> Result<(), AppError> {
        self.set_json(&keys::token(user_id), record).await
    }

    pub async fn delete(&self, user_id: &str) -> Result<(), AppError> {
        self.kv.del(&keys::token(user_id)).await
    }

    // ─── User Operations ─────────────────────────────────────────

    pub async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, AppError> {
        self.get_json(&keys::user(user_id)).await
    }

    /// Record a successful authorization, creating the profile on first login.
    pub async fn record_login(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<UserRecord, AppError> {
        let now_ms = now.timestamp_millis();
        let user = match self.get_user(user_id).await? {
            Some(existing) => UserRecord {
                last_login: now_ms,
                ..existing
            },
            None => UserRecord {
                id: user_id.to_string(),
                created_at: now_ms,
                last_login: now_ms,
            },
        };

        self.set_json(&keys::user(user_id), &user).await?;
        Ok(user)
    }

    // ─── Helpers ─────────────────────────────────────────────────

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        match self.kv.get(key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| AppError::Storage(format!("Corrupt record at {}: {}", key, e))),
            None => Ok(None),
        }
    }

    async fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), AppError> {
        let raw = serde_json::to_string(value)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Serialize {}: {}", key, e)))?;
        self.kv.set(key, raw).await
    }
}
