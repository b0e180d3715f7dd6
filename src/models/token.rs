// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Stored OAuth tokens and user profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OAuth tokens for one user, as persisted in the token store.
///
/// Field names are camelCase so records written by earlier deployments
/// stay readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token expiry (epoch milliseconds)
    pub expires_at: i64,
}

/// Authorization state derived from a stored record on each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    /// No record; the user never authorized.
    Unauthorized,
    /// Record present and not yet expired.
    Valid,
    /// Record present but `expires_at` has passed.
    Expired,
}

impl TokenRecord {
    /// Build a record from a token response received at `now`.
    pub fn issued_at(
        access_token: String,
        refresh_token: String,
        expires_in_secs: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at: now.timestamp_millis() + expires_in_secs * 1000,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() > self.expires_at
    }

    /// Classify an optional record at `now`.
    pub fn state(record: Option<&Self>, now: DateTime<Utc>) -> TokenState {
        match record {
            None => TokenState::Unauthorized,
            Some(r) if r.is_expired(now) => TokenState::Expired,
            Some(_) => TokenState::Valid,
        }
    }
}

/// User profile stored alongside the tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    /// First successful authorization (epoch milliseconds)
    pub created_at: i64,
    /// Most recent successful authorization (epoch milliseconds)
    pub last_login: i64,
}
