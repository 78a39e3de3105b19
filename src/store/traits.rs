//! `Storage` trait — keyed JSON blobs with optimistic concurrency.
//!
//! Conversation state and user state are both stored through this trait, one
//! key per conversation / user. Every stored item carries an etag; writers
//! pass back the etag they read and a mismatch is reported as
//! `StorageError::Conflict` instead of overwriting.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// A stored value together with the etag of the write that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreItem {
    pub value: serde_json::Value,
    pub etag: String,
}

/// Backend-agnostic key-value storage.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read a key. Returns `None` if it has never been written.
    async fn read(&self, key: &str) -> Result<Option<StoreItem>, StorageError>;

    /// Write a key and return the new etag.
    ///
    /// `expected_etag` is the etag observed at read time; `None` means the key
    /// was absent and must still be absent. Either mismatch is a conflict.
    async fn write(
        &self,
        key: &str,
        value: &serde_json::Value,
        expected_etag: Option<&str>,
    ) -> Result<String, StorageError>;

    /// Delete a key. Returns whether it existed.
    async fn delete(&self, key: &str) -> Result<bool, StorageError>;
}

/// Generate a fresh etag.
pub fn new_etag() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
