//! Turn-scoped state accessor.
//!
//! A `StateScope` is one storage key (a conversation or a user) loaded at the
//! start of a turn. Properties are read and written in memory; `save()` writes
//! the whole bag back once, guarded by the etag observed at load time.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::channels::Activity;
use crate::error::StorageError;
use crate::store::traits::Storage;

/// Storage key for the conversation an activity belongs to.
pub fn conversation_key(activity: &Activity) -> String {
    format!(
        "conversation/{}/{}",
        activity.channel_id, activity.conversation.id
    )
}

/// Storage key for the user who sent an activity.
pub fn user_key(activity: &Activity) -> String {
    format!("user/{}/{}", activity.channel_id, activity.from.id)
}

/// Property bag for one storage key, loaded for the duration of a turn.
#[derive(Debug, Clone)]
pub struct StateScope {
    key: String,
    properties: Map<String, Value>,
    etag: Option<String>,
    dirty: bool,
}

impl StateScope {
    /// Load the bag stored under `key`, or start an empty one.
    pub async fn load(storage: &dyn Storage, key: impl Into<String>) -> Result<Self, StorageError> {
        let key = key.into();
        let (properties, etag) = match storage.read(&key).await? {
            Some(item) => {
                let properties = match item.value {
                    Value::Object(map) => map,
                    Value::Null => Map::new(),
                    other => {
                        return Err(StorageError::Serialization(format!(
                            "state under {key} is not an object: {other}"
                        )));
                    }
                };
                (properties, Some(item.etag))
            }
            None => (Map::new(), None),
        };

        Ok(Self {
            key,
            properties,
            etag,
            dirty: false,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    /// Whether any property was set since load.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Read a typed property. `Ok(None)` if absent.
    pub fn get<T: DeserializeOwned>(&self, property: &str) -> Result<Option<T>, StorageError> {
        self.properties
            .get(property)
            .map(|v| serde_json::from_value(v.clone()))
            .transpose()
            .map_err(StorageError::from)
    }

    /// Write a typed property and mark the bag dirty.
    pub fn set<T: Serialize>(&mut self, property: &str, value: &T) -> Result<(), StorageError> {
        let value = serde_json::to_value(value)?;
        self.properties.insert(property.to_string(), value);
        self.dirty = true;
        Ok(())
    }

    /// Write the bag back if it changed. A stale etag fails with `Conflict`.
    pub async fn save(&mut self, storage: &dyn Storage) -> Result<(), StorageError> {
        if !self.dirty {
            return Ok(());
        }
        let value = Value::Object(self.properties.clone());
        let etag = storage.write(&self.key, &value, self.etag.as_deref()).await?;
        debug!(key = %self.key, etag = %etag, "State saved");
        self.etag = Some(etag);
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStorage;

    #[tokio::test]
    async fn unchanged_scope_is_not_written() {
        let storage = MemoryStorage::new();
        let mut scope = StateScope::load(&storage, "user/cli/u1").await.unwrap();
        scope.save(&storage).await.unwrap();
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn set_and_reload() {
        let storage = MemoryStorage::new();
        let mut scope = StateScope::load(&storage, "user/cli/u1").await.unwrap();
        scope.set("Greeting", &"hello").unwrap();
        assert!(scope.is_dirty());
        scope.save(&storage).await.unwrap();
        assert!(!scope.is_dirty());

        let reloaded = StateScope::load(&storage, "user/cli/u1").await.unwrap();
        let greeting: Option<String> = reloaded.get("Greeting").unwrap();
        assert_eq!(greeting.as_deref(), Some("hello"));
        assert_eq!(reloaded.etag(), scope.etag());
    }

    #[tokio::test]
    async fn concurrent_turns_conflict() {
        let storage = MemoryStorage::new();
        let mut a = StateScope::load(&storage, "conversation/cli/c").await.unwrap();
        let mut b = StateScope::load(&storage, "conversation/cli/c").await.unwrap();

        a.set("n", &1).unwrap();
        a.save(&storage).await.unwrap();

        b.set("n", &2).unwrap();
        let err = b.save(&storage).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict { .. }));
    }

    #[test]
    fn keys_are_scoped_by_channel() {
        let activity = Activity::message("msteams", "conv-9", "user-3", "hi");
        assert_eq!(conversation_key(&activity), "conversation/msteams/conv-9");
        assert_eq!(user_key(&activity), "user/msteams/user-3");
    }
}
