//! # Serialized Store Backend
//!
//! Where the database blob lives between runs.
//!
//! ## One Contract, Two Targets
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          BlobStore                                      │
//! │        load() -> bytes | NotFound            save(bytes)               │
//! │                                                                         │
//! │   ┌──────────────────────────┐     ┌──────────────────────────────┐    │
//! │   │ FileStore                │     │ LocalStorageStore            │    │
//! │   │ <data dir>/swiftbill.db  │     │ key "swiftbill"              │    │
//! │   │ temp file + fsync +      │     │ JSON byte array, one         │    │
//! │   │ rename over target       │     │ set_item per save            │    │
//! │   └──────────────────────────┘     └──────────────────────────────┘    │
//! │                                                                         │
//! │  The backend is chosen once, in DbConfig. Nothing downstream knows     │
//! │  which one it is talking to.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both implementations replace the whole blob on every save. A crash
//! mid-save leaves the previous blob readable, never a truncated one.

pub mod file;
pub mod local;

use async_trait::async_trait;

use crate::error::StoreResult;

pub use file::FileStore;
pub use local::{KeyValueStorage, LocalStorageStore, MemoryKeyValue, DEFAULT_STORAGE_KEY};

/// Durable home of the serialized database.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Reads the last saved blob.
    ///
    /// ## Returns
    /// * `Ok(bytes)` - The blob from the previous `save`
    /// * `Err(StoreError::NotFound)` - Nothing saved yet (first run)
    /// * `Err(StoreError::Io | Encoding)` - Stored data is unreadable
    async fn load(&self) -> StoreResult<Vec<u8>>;

    /// Replaces the stored blob with `blob`.
    async fn save(&self, blob: &[u8]) -> StoreResult<()>;

    /// Human-readable location for logs and errors.
    fn describe(&self) -> String;
}
