//! # Local Storage Store
//!
//! Browser backend: the blob is a JSON array of byte values kept under one
//! string key (`"swiftbill"`), the same encoding the web build has always
//! written:
//!
//! ```text
//! localStorage["swiftbill"] = "[83,81,76,105,116,101,32,102,...]"
//! ```
//!
//! The host's storage is reached through [`KeyValueStorage`]; a webview
//! bridge implements it over `window.localStorage`, and
//! [`MemoryKeyValue`] serves headless runs and tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::sync::{Arc, Mutex};
use tracing::debug;

use super::BlobStore;
use crate::error::{StoreError, StoreResult};

/// Key the browser build stores the database under.
pub const DEFAULT_STORAGE_KEY: &str = "swiftbill";

/// Synchronous string key/value storage, shaped like `window.localStorage`.
pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;

    /// Fails when the host refuses the write (quota exceeded).
    fn set_item(&self, key: &str, value: String) -> std::io::Result<()>;

    fn remove_item(&self, key: &str);
}

// =============================================================================
// In-Memory Key/Value
// =============================================================================

/// Process-local [`KeyValueStorage`].
///
/// An optional quota (in bytes of stored value) mimics the browser's
/// `QuotaExceededError`.
#[derive(Debug, Default)]
pub struct MemoryKeyValue {
    items: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryKeyValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects any single value longer than `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        MemoryKeyValue {
            items: Mutex::new(HashMap::new()),
            quota: Some(bytes),
        }
    }

    fn items(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A panic while holding the lock cannot leave the map half-written
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStorage for MemoryKeyValue {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: String) -> std::io::Result<()> {
        if let Some(quota) = self.quota {
            if value.len() > quota {
                return Err(std::io::Error::new(
                    ErrorKind::Other,
                    format!("quota exceeded: {} > {} bytes", value.len(), quota),
                ));
            }
        }
        self.items().insert(key.to_string(), value);
        Ok(())
    }

    fn remove_item(&self, key: &str) {
        self.items().remove(key);
    }
}

// =============================================================================
// Local Storage Blob Store
// =============================================================================

/// Blob store over a [`KeyValueStorage`] key.
#[derive(Clone)]
pub struct LocalStorageStore {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
}

impl LocalStorageStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        LocalStorageStore {
            storage,
            key: key.into(),
        }
    }

    /// Store under the default `"swiftbill"` key.
    pub fn with_default_key(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self::new(storage, DEFAULT_STORAGE_KEY)
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl std::fmt::Debug for LocalStorageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStorageStore")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl BlobStore for LocalStorageStore {
    async fn load(&self) -> StoreResult<Vec<u8>> {
        let raw = self.storage.get_item(&self.key).ok_or_else(|| StoreError::NotFound {
            location: self.describe(),
        })?;

        let bytes: Vec<u8> = serde_json::from_str(&raw).map_err(|e| StoreError::Encoding {
            location: self.describe(),
            reason: e.to_string(),
        })?;

        debug!(key = %self.key, size = bytes.len(), "Read database from local storage");
        Ok(bytes)
    }

    async fn save(&self, blob: &[u8]) -> StoreResult<()> {
        let encoded = serde_json::to_string(blob).map_err(|e| StoreError::Encoding {
            location: self.describe(),
            reason: e.to_string(),
        })?;

        self.storage
            .set_item(&self.key, encoded)
            .map_err(|e| StoreError::io(self.describe(), e))?;

        debug!(key = %self.key, size = blob.len(), "Wrote database to local storage");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("localStorage:{}", self.key)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_uses_json_byte_array() {
        let storage = Arc::new(MemoryKeyValue::new());
        let store = LocalStorageStore::with_default_key(storage.clone());

        store.save(&[0, 7, 255]).await.unwrap();

        assert_eq!(storage.get_item("swiftbill").as_deref(), Some("[0,7,255]"));
        assert_eq!(store.load().await.unwrap(), vec![0, 7, 255]);
    }

    #[tokio::test]
    async fn test_missing_key_is_not_found() {
        let store = LocalStorageStore::new(Arc::new(MemoryKeyValue::new()), "other");
        assert!(store.load().await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_garbage_value_is_encoding_error() {
        let storage = Arc::new(MemoryKeyValue::new());
        storage.set_item("swiftbill", "not json".to_string()).unwrap();

        let store = LocalStorageStore::with_default_key(storage);
        assert!(matches!(
            store.load().await.unwrap_err(),
            StoreError::Encoding { .. }
        ));
    }

    #[tokio::test]
    async fn test_quota_exceeded_keeps_previous_value() {
        let storage = Arc::new(MemoryKeyValue::with_quota(16));
        let store = LocalStorageStore::with_default_key(storage);

        store.save(&[1, 2, 3]).await.unwrap();
        let err = store.save(&[9; 64]).await.unwrap_err();

        assert!(matches!(err, StoreError::Io { .. }));
        assert_eq!(store.load().await.unwrap(), vec![1, 2, 3]);
    }
}
