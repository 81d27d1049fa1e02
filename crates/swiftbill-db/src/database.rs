//! # Database Handle
//!
//! Opening the stored blob, the single-writer commit pipeline and
//! repository access.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Database (Clone)                               │
//! │                                                                         │
//! │  App Startup                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::file(path) / DbConfig::local_storage(kv, key)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::open(config).await ← load blob, verify or create schema     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌──────────────────────────────┐   ┌───────────────────────────────┐  │
//! │  │ writer: tokio Mutex          │   │ snapshot: RwLock<Arc<..>>     │  │
//! │  │  ├─ Engine (in-memory SQLite)│   │  clients / items / invoices   │  │
//! │  │  └─ committed blob           │   │  settings / metrics           │  │
//! │  └──────────────┬───────────────┘   └───────────────▲───────────────┘  │
//! │                 │ one mutation at a time            │ swapped after    │
//! │                 ▼                                   │ each commit      │
//! │     execute ─► export ─► store.save ─► reload ──────┘                  │
//! │                              │                                          │
//! │                              └─ fails? engine rebuilt from committed   │
//! │                                 blob, error returned                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariant
//! After every call returns, the engine holds exactly what the store holds.
//! Readers never wait on storage I/O: they clone the current snapshot `Arc`.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use swiftbill_core::SettingsPatch;

use crate::engine::Engine;
use crate::error::DbResult;
use crate::repository::client::ClientRepository;
use crate::repository::invoice::InvoiceRepository;
use crate::repository::item::ItemRepository;
use crate::repository::metrics::MetricsRepository;
use crate::repository::settings::SettingsRepository;
use crate::schema;
use crate::snapshot::{Collection, Snapshot};
use crate::store::{BlobStore, FileStore, KeyValueStorage, LocalStorageStore, MemoryKeyValue};

// =============================================================================
// Configuration
// =============================================================================

/// Where the blob is stored. Chosen once, at startup.
#[derive(Clone)]
pub enum StoreConfig {
    /// Plain SQLite file (desktop).
    File { path: PathBuf },

    /// JSON byte array under a string key (browser local storage).
    LocalStorage {
        storage: Arc<dyn KeyValueStorage>,
        key: String,
    },

    /// Any other backend.
    Custom(Arc<dyn BlobStore>),
}

impl StoreConfig {
    pub fn build(&self) -> Arc<dyn BlobStore> {
        match self {
            StoreConfig::File { path } => Arc::new(FileStore::new(path.clone())),
            StoreConfig::LocalStorage { storage, key } => {
                Arc::new(LocalStorageStore::new(storage.clone(), key.clone()))
            }
            StoreConfig::Custom(store) => store.clone(),
        }
    }
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreConfig::File { path } => f.debug_struct("File").field("path", path).finish(),
            StoreConfig::LocalStorage { key, .. } => f
                .debug_struct("LocalStorage")
                .field("key", key)
                .finish_non_exhaustive(),
            StoreConfig::Custom(store) => f.debug_tuple("Custom").field(&store.describe()).finish(),
        }
    }
}

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::file("/path/to/swiftbill.db");
/// let db = Database::open(config).await?;
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub store: StoreConfig,

    /// Settings carried over from an older backup format, merged into the
    /// settings row once the database is open.
    pub pending_settings: Option<SettingsPatch>,
}

impl DbConfig {
    /// File-backed database at `path`. Parent directories are created on
    /// first save.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::with_store_config(StoreConfig::File { path: path.into() })
    }

    /// Database kept in a local-storage style key/value host.
    pub fn local_storage(storage: Arc<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        Self::with_store_config(StoreConfig::LocalStorage {
            storage,
            key: key.into(),
        })
    }

    /// Database backed by a caller-supplied store.
    pub fn with_store(store: Arc<dyn BlobStore>) -> Self {
        Self::with_store_config(StoreConfig::Custom(store))
    }

    /// Fresh, process-local database (for tests and demos).
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let db = Database::open(DbConfig::in_memory()).await?;
    /// // Isolated: nothing survives the process
    /// ```
    pub fn in_memory() -> Self {
        Self::local_storage(
            Arc::new(MemoryKeyValue::new()),
            crate::store::DEFAULT_STORAGE_KEY,
        )
    }

    /// Sets settings to apply once after open.
    pub fn pending_settings(mut self, patch: SettingsPatch) -> Self {
        self.pending_settings = Some(patch);
        self
    }

    fn with_store_config(store: StoreConfig) -> Self {
        DbConfig {
            store,
            pending_settings: None,
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Engine plus the last blob the store accepted.
struct Writer {
    engine: Engine,
    committed: Vec<u8>,
}

/// Row counts and blob size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseStats {
    pub clients: usize,
    pub items: usize,
    pub invoices: usize,
    pub blob_bytes: usize,
}

/// Main database handle providing repository access.
///
/// Cheap to clone; every clone shares one engine, one store and one
/// snapshot. Construct it once at startup and pass it to whatever needs
/// data access.
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::open(DbConfig::file(path)).await?;
///
/// let acme = db.clients().add(ClientInput { name: "Acme".into(), ..Default::default() }).await?;
/// let next_no = db.invoices().generate_number().await?;
/// let metrics = db.snapshot().metrics;
/// ```
#[derive(Clone)]
pub struct Database {
    writer: Arc<Mutex<Writer>>,
    store: Arc<dyn BlobStore>,
    snapshot: Arc<RwLock<Arc<Snapshot>>>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("store", &self.store.describe())
            .finish_non_exhaustive()
    }
}

impl Database {
    /// Opens the stored database, creating it on first run.
    ///
    /// ## What This Does
    /// 1. `store.load()`
    /// 2. Blob found: rebuild the engine from it and verify the schema
    ///    (a missing `vehicle_number` column is added and persisted)
    /// 3. Nothing stored: create the schema and persist the new blob
    ///    before returning
    /// 4. Load the snapshot
    /// 5. Apply `pending_settings`, if any; failure there is logged, not
    ///    returned
    ///
    /// ## Returns
    /// * `Err(DbError::Storage)` - The store could not be read or written
    /// * `Err(DbError::CorruptBlob)` - Stored bytes are not a database
    /// * `Err(DbError::SchemaMismatch)` - Stored database is not ours
    pub async fn open(config: DbConfig) -> DbResult<Self> {
        let store = config.store.build();
        info!(store = %store.describe(), "Opening database");

        let (engine, committed) = match store.load().await {
            Ok(bytes) => {
                let engine = Engine::open(Some(&bytes))?;
                schema::verify_schema(&engine)?;

                if schema::upgrade_schema(&engine)? {
                    let blob = engine.export()?;
                    store.save(&blob).await?;
                    (engine, blob)
                } else {
                    (engine, bytes)
                }
            }
            Err(e) if e.is_not_found() => {
                info!("No stored database, creating a new one");
                let engine = Engine::open(None)?;
                schema::create_schema(&engine)?;
                let blob = engine.export()?;
                store.save(&blob).await?;
                (engine, blob)
            }
            Err(e) => {
                error!(store = %store.describe(), error = %e, "Failed to load database");
                return Err(e.into());
            }
        };

        let snapshot = Snapshot::load(&engine)?;
        info!(
            clients = snapshot.clients.len(),
            items = snapshot.items.len(),
            invoices = snapshot.invoices.len(),
            size = committed.len(),
            "Database ready"
        );

        let db = Database {
            writer: Arc::new(Mutex::new(Writer { engine, committed })),
            store,
            snapshot: Arc::new(RwLock::new(Arc::new(snapshot))),
        };

        if let Some(patch) = config.pending_settings {
            if let Err(e) = db.settings().update(patch).await {
                warn!(error = %e, "Could not apply carried-over settings");
            }
        }

        Ok(db)
    }

    /// Runs one mutation through the commit pipeline.
    ///
    /// `f` runs against the engine with the writer lock held. On success
    /// the engine is exported and saved, then the `affected` snapshot
    /// collections are reloaded. If `f` or the save fails, the engine is
    /// rebuilt from the last committed blob and the error is returned.
    pub(crate) async fn mutate<T, F>(&self, affected: &[Collection], f: F) -> DbResult<T>
    where
        F: FnOnce(&Engine) -> DbResult<T> + Send,
        T: Send,
    {
        let mut writer = self.writer.lock().await;

        let value = match f(&writer.engine) {
            Ok(value) => value,
            Err(e) => {
                debug!(error = %e, "Mutation failed, discarding engine changes");
                Self::rollback(&mut writer)?;
                return Err(e);
            }
        };
        let blob = match writer.engine.export() {
            Ok(blob) => blob,
            Err(e) => {
                error!(error = %e, "Failed to export database");
                Self::rollback(&mut writer)?;
                return Err(e);
            }
        };

        if let Err(e) = self.store.save(&blob).await {
            error!(store = %self.store.describe(), error = %e, "Failed to persist database");
            Self::rollback(&mut writer)?;
            return Err(e.into());
        }

        writer.committed = blob;
        let next = self.current().reload(&writer.engine, affected)?;
        self.publish(next);

        debug!(size = writer.committed.len(), ?affected, "Mutation committed");
        Ok(value)
    }

    /// Runs a read-only query against the engine.
    pub(crate) async fn read<T, F>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&Engine) -> DbResult<T> + Send,
    {
        let writer = self.writer.lock().await;
        f(&writer.engine)
    }

    /// Persists `committed` and swaps in `engine`, which must already hold
    /// it, then reloads every collection.
    ///
    /// Runs under the writer lock so no mutation can commit between the
    /// save and the swap. If the save fails nothing changes.
    pub(crate) async fn replace(&self, engine: Engine, committed: Vec<u8>) -> DbResult<()> {
        let mut writer = self.writer.lock().await;
        let snapshot = Snapshot::load(&engine)?;

        if let Err(e) = self.store.save(&committed).await {
            error!(
                store = %self.store.describe(),
                error = %e,
                "Failed to persist replacement database"
            );
            return Err(e.into());
        }

        writer.engine = engine;
        writer.committed = committed;
        self.publish(snapshot);
        Ok(())
    }

    /// Rebuilds the engine from the last committed blob.
    fn rollback(writer: &mut Writer) -> DbResult<()> {
        writer.engine = Engine::open(Some(&writer.committed))?;
        Ok(())
    }

    fn current(&self) -> Arc<Snapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn publish(&self, next: Snapshot) {
        *self
            .snapshot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Arc::new(next);
    }

    /// The collections as of the last commit.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current()
    }

    /// The backend the blob lives in.
    pub fn store(&self) -> &Arc<dyn BlobStore> {
        &self.store
    }

    /// Copy of the blob last accepted by the store.
    pub async fn export_blob(&self) -> Vec<u8> {
        self.writer.lock().await.committed.clone()
    }

    /// Row counts from the snapshot plus the committed blob size.
    pub async fn stats(&self) -> DatabaseStats {
        let blob_bytes = self.writer.lock().await.committed.len();
        let snapshot = self.current();
        DatabaseStats {
            clients: snapshot.clients.len(),
            items: snapshot.items.len(),
            invoices: snapshot.invoices.len(),
            blob_bytes,
        }
    }

    /// True when the engine answers a trivial query.
    pub async fn health_check(&self) -> bool {
        self.read(|engine| engine.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)))
            .await
            .is_ok()
    }

    // =========================================================================
    // Repositories
    // =========================================================================

    pub fn clients(&self) -> ClientRepository {
        ClientRepository::new(self.clone())
    }

    pub fn items(&self) -> ItemRepository {
        ItemRepository::new(self.clone())
    }

    pub fn invoices(&self) -> InvoiceRepository {
        InvoiceRepository::new(self.clone())
    }

    pub fn settings(&self) -> SettingsRepository {
        SettingsRepository::new(self.clone())
    }

    pub fn metrics(&self) -> MetricsRepository {
        MetricsRepository::new(self.clone())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
