//! # swiftbill-db: Persistence Core for SwiftBill
//!
//! One serialized SQLite database, held in memory while the app runs and
//! written back in full after every change.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SwiftBill Data Flow                              │
//! │                                                                         │
//! │  Desktop command (add_client, save_invoice, ...)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   swiftbill-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌───────────────┐   ┌────────────────┐  │   │
//! │  │   │ Repositories  │──►│   Database    │──►│    Engine      │  │   │
//! │  │   │ client, item, │   │ writer mutex  │   │ in-memory      │  │   │
//! │  │   │ invoice, ...  │   │ + snapshot    │   │ SQLite         │  │   │
//! │  │   └───────────────┘   └───────┬───────┘   └────────────────┘  │   │
//! │  │                               │ export() after each mutation   │   │
//! │  │                               ▼                                 │   │
//! │  │                      ┌─────────────────┐                       │   │
//! │  │                      │   BlobStore     │                       │   │
//! │  │                      │ file | local kv │                       │   │
//! │  │                      └─────────────────┘                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                               │                                         │
//! │                               ▼                                         │
//! │   <data dir>/swiftbill.db   or   localStorage["swiftbill"]             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - Where the blob lives (file, local storage)
//! - [`engine`] - In-memory SQLite with blob import/export
//! - [`schema`] - Table definitions and verification
//! - [`database`] - Open, commit pipeline, repository access
//! - [`snapshot`] - Cached collections for readers
//! - [`repository`] - Client, item, invoice, settings and metrics access
//! - [`backup`] - Dated backups and restore
//! - [`error`] - Storage and database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use swiftbill_db::{Database, DbConfig};
//!
//! let db = Database::open(DbConfig::file("path/to/swiftbill.db")).await?;
//!
//! let next = db.invoices().generate_number().await?;
//! let clients = db.clients().list();
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backup;
pub mod database;
pub mod engine;
pub mod error;
pub mod repository;
pub mod schema;
pub mod snapshot;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use database::{Database, DatabaseStats, DbConfig, StoreConfig};
pub use engine::Engine;
pub use error::{DbError, DbResult, StoreError, StoreResult};
pub use snapshot::Snapshot;
pub use store::{BlobStore, FileStore, KeyValueStorage, LocalStorageStore, MemoryKeyValue};

// Repository re-exports for convenience
pub use repository::client::ClientRepository;
pub use repository::invoice::InvoiceRepository;
pub use repository::item::ItemRepository;
pub use repository::metrics::MetricsRepository;
pub use repository::settings::SettingsRepository;

/// File name of the desktop database.
pub const DATABASE_FILE_NAME: &str = "swiftbill.db";
