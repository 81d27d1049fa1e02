//! # SwiftBill Desktop Library
//!
//! Host-facing layer of the SwiftBill desktop app. The window shell calls
//! [`init_tracing`], then [`bootstrap`], then routes UI invocations to the
//! functions in [`commands`].
//!
//! ## Module Organization
//! ```text
//! swiftbill_desktop/
//! ├── lib.rs          ◄─── You are here (startup)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── db.rs       ◄─── Database state wrapper
//! │   └── config.rs   ◄─── Storage configuration from env
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   ├── client.rs   ◄─── Client CRUD
//! │   ├── item.rs     ◄─── Catalog item CRUD
//! │   ├── invoice.rs  ◄─── Invoices, numbering, metrics, statements
//! │   ├── settings.rs ◄─── Settings, backup
//! │   └── bridge.rs   ◄─── Raw database bytes in and out
//! └── error.rs        ◄─── API error type for commands
//! ```

pub mod commands;
pub mod error;
pub mod state;

pub use error::{ApiError, ErrorCode};
pub use state::{AppConfig, DbState, StorageMode};

use tracing::info;
use tracing_subscriber::EnvFilter;

use swiftbill_db::Database;

/// Opens the database described by `config`.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Application Startup                               │
/// │                                                                         │
/// │  1. Resolve storage ─── file path (env or data dir) or memory key       │
/// │  2. Load blob ───────── absent: create schema and persist immediately   │
/// │                         present: open, verify tables, add new columns   │
/// │  3. Build snapshot ──── clients, items, invoices, settings, metrics     │
/// │  4. Hand back DbState ─ shared by every command                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn bootstrap(config: &AppConfig) -> Result<DbState, ApiError> {
    info!(storage = ?config.storage, "Starting SwiftBill");

    let db = Database::open(config.db_config()).await?;
    let stats = db.stats().await;
    info!(
        clients = stats.clients,
        items = stats.items,
        invoices = stats.invoices,
        blob_bytes = stats.blob_bytes,
        "Database ready"
    );

    Ok(DbState::new(db))
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=swiftbill_db=trace` - Trace the persistence layer only
/// - Default: INFO, DEBUG for swiftbill crates
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,swiftbill=debug"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
