// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process key-value store for local runs and tests.

use super::KvStore;
use crate::error::AppError;
use dashmap::DashMap;
use std::sync::Arc;

/// Key-value store backed by a shared `DashMap`. Clones share contents.
#[derive(Clone, Default)]
pub struct MemoryKv {
    entries: Arc<DashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait::async_trait]
impl KvStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), AppError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), AppError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_set_del() {
        let kv = MemoryKv::new();
        assert_eq!(kv.get("k").await.unwrap(), None);

        kv.set("k", "v1".to_string()).await.unwrap();
        kv.set("k", "v2".to_string()).await.unwrap();
        assert_eq!(kv.get("k").await.unwrap().as_deref(), Some("v2"));
        assert_eq!(kv.len(), 1);

        kv.del("k").await.unwrap();
        assert!(kv.is_empty());
        // Deleting a missing key is not an error.
        kv.del("k").await.unwrap();
    }
}
