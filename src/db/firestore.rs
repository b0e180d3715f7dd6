// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore-backed key-value store.
//!
//! Each key is one document in the `kv` collection holding the raw string
//! value, so the store stays agnostic of what it persists.

use super::KvStore;
use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// Collection holding all key-value documents.
const KV_COLLECTION: &str = "kv";

/// Document shape for one key.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct KvDocument {
    value: String,
    updated_at: String,
}

/// Firestore key-value client.
#[derive(Clone)]
pub struct FirestoreKv {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreKv {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Storage(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a disconnected client; every operation fails with a storage error.
    pub fn new_offline() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Storage("Database not connected (offline mode)".to_string()))
    }
}

#[async_trait::async_trait]
impl KvStore for FirestoreKv {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let doc: Option<KvDocument> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(KV_COLLECTION)
            .obj()
            .one(key)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        Ok(doc.map(|d| d.value))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), AppError> {
        let doc = KvDocument {
            value,
            updated_at: crate::time_utils::format_utc_rfc3339(chrono::Utc::now()),
        };

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(KV_COLLECTION)
            .document_id(key)
            .object(&doc)
            .execute()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(KV_COLLECTION)
            .document_id(key)
            .execute()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;
        Ok(())
    }
}
