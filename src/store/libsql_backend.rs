//! libSQL backend — durable `Storage` implementation.
//!
//! State lives in a single `bot_state` table. Optimistic concurrency is
//! enforced in SQL: creates use `INSERT ... ON CONFLICT DO NOTHING`, updates
//! are guarded by `WHERE etag = ?`, and zero affected rows means someone else
//! wrote first.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};

use crate::error::StorageError;
use crate::store::migrations;
use crate::store::traits::{Storage, StoreItem, new_etag};

/// libSQL storage backend.
///
/// Stores a single connection that is reused for all operations.
pub struct LibSqlStorage {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlStorage {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StorageError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let storage = Self::from_database(db).await?;
        info!(path = %path.display(), "State database opened");
        Ok(storage)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, StorageError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                StorageError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;
        Self::from_database(db).await
    }

    async fn from_database(db: LibSqlDatabase) -> Result<Self, StorageError> {
        let conn = db
            .connect()
            .map_err(|e| StorageError::Pool(format!("Failed to create connection: {e}")))?;
        migrations::run_migrations(&conn).await?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// The leading path segment of a key, e.g. `conversation` or `user`.
fn scope_of(key: &str) -> &str {
    key.split('/').next().unwrap_or_default()
}

#[async_trait]
impl Storage for LibSqlStorage {
    async fn read(&self, key: &str) -> Result<Option<StoreItem>, StorageError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT value, etag FROM bot_state WHERE key = ?1",
                params![key],
            )
            .await
            .map_err(|e| StorageError::Query(format!("read: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let value_str: String = row
                    .get(0)
                    .map_err(|e| StorageError::Query(format!("read value: {e}")))?;
                let etag: String = row
                    .get(1)
                    .map_err(|e| StorageError::Query(format!("read etag: {e}")))?;
                let value = serde_json::from_str(&value_str)?;
                Ok(Some(StoreItem { value, etag }))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(StorageError::Query(format!("read: {e}"))),
        }
    }

    async fn write(
        &self,
        key: &str,
        value: &serde_json::Value,
        expected_etag: Option<&str>,
    ) -> Result<String, StorageError> {
        let value_str = serde_json::to_string(value)?;
        let etag = new_etag();
        let now = Utc::now().to_rfc3339();

        let affected = match expected_etag {
            None => self
                .conn()
                .execute(
                    "INSERT INTO bot_state (key, value, etag, updated_at, scope)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT (key) DO NOTHING",
                    params![key, value_str, etag.clone(), now, scope_of(key)],
                )
                .await
                .map_err(|e| StorageError::Query(format!("write: {e}")))?,
            Some(expected) => self
                .conn()
                .execute(
                    "UPDATE bot_state SET value = ?2, etag = ?3, updated_at = ?4
                     WHERE key = ?1 AND etag = ?5",
                    params![key, value_str, etag.clone(), now, expected],
                )
                .await
                .map_err(|e| StorageError::Query(format!("write: {e}")))?,
        };

        if affected == 0 {
            debug!(key, ?expected_etag, "Rejected stale write");
            return Err(StorageError::Conflict {
                key: key.to_string(),
            });
        }
        Ok(etag)
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        let count = self
            .conn()
            .execute("DELETE FROM bot_state WHERE key = ?1", params![key])
            .await
            .map_err(|e| StorageError::Query(format!("delete: {e}")))?;
        Ok(count > 0)
    }
}
