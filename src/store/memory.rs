//! In-memory storage — the default backend when no database path is set.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StorageError;
use crate::store::traits::{Storage, StoreItem, new_etag};

/// `Storage` backed by a `HashMap` behind an async `RwLock`.
///
/// State survives for the life of the process only.
#[derive(Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, StoreItem>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn read(&self, key: &str) -> Result<Option<StoreItem>, StorageError> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn write(
        &self,
        key: &str,
        value: &serde_json::Value,
        expected_etag: Option<&str>,
    ) -> Result<String, StorageError> {
        let mut items = self.items.write().await;
        let current = items.get(key).map(|item| item.etag.as_str());
        if current != expected_etag {
            debug!(key, ?current, ?expected_etag, "Rejected stale write");
            return Err(StorageError::Conflict {
                key: key.to_string(),
            });
        }

        let etag = new_etag();
        items.insert(
            key.to_string(),
            StoreItem {
                value: value.clone(),
                etag: etag.clone(),
            },
        );
        Ok(etag)
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.items.write().await.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn write_then_read() {
        let storage = MemoryStorage::new();
        assert!(storage.read("k").await.unwrap().is_none());

        let etag = storage.write("k", &json!({"a": 1}), None).await.unwrap();
        let item = storage.read("k").await.unwrap().unwrap();
        assert_eq!(item.value, json!({"a": 1}));
        assert_eq!(item.etag, etag);
    }

    #[tokio::test]
    async fn stale_etag_conflicts() {
        let storage = MemoryStorage::new();
        let first = storage.write("k", &json!(1), None).await.unwrap();
        let second = storage.write("k", &json!(2), Some(&first)).await.unwrap();
        assert_ne!(first, second);

        let err = storage.write("k", &json!(3), Some(&first)).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict { .. }));
        assert_eq!(storage.read("k").await.unwrap().unwrap().value, json!(2));
    }

    #[tokio::test]
    async fn create_over_existing_conflicts() {
        let storage = MemoryStorage::new();
        storage.write("k", &json!(1), None).await.unwrap();
        let err = storage.write("k", &json!(2), None).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict { .. }));
    }

    #[tokio::test]
    async fn delete_removes_key() {
        let storage = MemoryStorage::new();
        storage.write("k", &json!(1), None).await.unwrap();
        assert!(storage.delete("k").await.unwrap());
        assert!(!storage.delete("k").await.unwrap());
        assert!(storage.is_empty().await);
    }
}
