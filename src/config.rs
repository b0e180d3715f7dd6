// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Read once at startup; the resulting `Config` is shared read-only
//! through `AppState`.

use std::env;
use std::time::Duration;

/// Callback path registered with WHOOP as the OAuth redirect target.
pub const CALLBACK_PATH: &str = "/api/auth/callback";

/// Which key-value backend holds token records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Google Firestore (production).
    Firestore,
    /// Process-local map; tokens are lost on restart.
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(Self::Firestore),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::Invalid("TOKEN_STORE")),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// WHOOP OAuth client ID (public)
    pub whoop_client_id: String,
    /// Externally reachable base URL of this service
    pub public_url: String,
    /// User whose dashboard this instance serves
    pub user_id: String,
    /// Server port
    pub port: u16,
    /// Token store backend
    pub token_store: StoreBackend,
    /// GCP project ID (Firestore backend)
    pub gcp_project_id: String,
    /// WHOOP REST API base URL
    pub whoop_api_base_url: String,
    /// WHOOP OAuth authorize endpoint
    pub whoop_auth_url: String,
    /// WHOOP OAuth token endpoint
    pub whoop_token_url: String,
    /// Per-request timeout for WHOOP calls
    pub upstream_timeout: Duration,
    /// Show error details on the dashboard error page
    pub expose_error_details: bool,

    // --- Secrets ---
    /// WHOOP OAuth client secret
    pub whoop_client_secret: String,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            whoop_client_id: "test_client_id".to_string(),
            public_url: "http://localhost:8080".to_string(),
            user_id: "default-user".to_string(),
            port: 8080,
            token_store: StoreBackend::Memory,
            gcp_project_id: "test-project".to_string(),
            whoop_api_base_url: "https://api.prod.whoop.com/developer/v2".to_string(),
            whoop_auth_url: "https://api.prod.whoop.com/oauth/oauth2/auth".to_string(),
            whoop_token_url: "https://api.prod.whoop.com/oauth/oauth2/token".to_string(),
            upstream_timeout: Duration::from_secs(10),
            expose_error_details: false,
            whoop_client_secret: "test_secret".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();

        Ok(Self {
            whoop_client_id: env::var("WHOOP_CLIENT_ID")
                .map_err(|_| ConfigError::Missing("WHOOP_CLIENT_ID"))?,
            public_url: env::var("PUBLIC_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.public_url),
            user_id: env::var("DASHBOARD_USER_ID").unwrap_or(defaults.user_id),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            token_store: env::var("TOKEN_STORE")
                .unwrap_or_else(|_| "firestore".to_string())
                .parse()?,
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            whoop_api_base_url: env::var("WHOOP_API_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.whoop_api_base_url),
            whoop_auth_url: env::var("WHOOP_AUTH_URL").unwrap_or(defaults.whoop_auth_url),
            whoop_token_url: env::var("WHOOP_TOKEN_URL").unwrap_or(defaults.whoop_token_url),
            upstream_timeout: env::var("UPSTREAM_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.upstream_timeout),
            expose_error_details: env::var("EXPOSE_ERROR_DETAILS")
                .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
                .unwrap_or(false),

            whoop_client_secret: env::var("WHOOP_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("WHOOP_CLIENT_SECRET"))?,
        })
    }

    /// OAuth redirect URI derived from the public URL.
    pub fn redirect_uri(&self) -> String {
        format!("{}{}", self.public_url, CALLBACK_PATH)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("WHOOP_CLIENT_ID", "test_id");
        env::set_var("WHOOP_CLIENT_SECRET", " test_secret\n");
        env::set_var("PUBLIC_URL", "https://trmnl.example.com/");
        env::set_var("TOKEN_STORE", "memory");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.whoop_client_id, "test_id");
        assert_eq!(config.whoop_client_secret, "test_secret");
        assert_eq!(config.port, 8080);
        assert_eq!(config.token_store, StoreBackend::Memory);
        assert_eq!(
            config.redirect_uri(),
            "https://trmnl.example.com/api/auth/callback"
        );
    }

    #[test]
    fn test_store_backend_parse() {
        assert_eq!(
            "Firestore".parse::<StoreBackend>().unwrap(),
            StoreBackend::Firestore
        );
        assert_eq!(
            " memory ".parse::<StoreBackend>().unwrap(),
            StoreBackend::Memory
        );
        assert!("redis".parse::<StoreBackend>().is_err());
    }
}
