// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage layer: a string key-value backend and the token store on top.

pub mod firestore;
pub mod memory;
pub mod token_store;

pub use firestore::FirestoreKv;
pub use memory::MemoryKv;
pub use token_store::TokenStore;

use crate::error::AppError;

/// Key prefixes as constants.
pub mod keys {
    pub const TOKEN_PREFIX: &str = "whoop:token:";
    pub const USER_PREFIX: &str = "whoop:user:";

    pub fn token(user_id: &str) -> String {
        format!("{}{}", TOKEN_PREFIX, user_id)
    }

    pub fn user(user_id: &str) -> String {
        format!("{}{}", USER_PREFIX, user_id)
    }
}

/// Minimal key-value contract the token store needs.
///
/// Implementations report backend failures as `AppError::Storage`.
#[async_trait::async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    async fn set(&self, key: &str, value: String) -> Result<(), AppError>;
    async fn del(&self, key: &str) -> Result<(), AppError>;
}
