//! # Backup and Restore
//!
//! ```text
//! backup_to_folder("/exports")
//!   └─► /exports/backups/swiftbill-backup-2024-03-05.bin   (committed blob)
//!
//! restore(bytes)
//!   ├─► Engine::open(bytes)        CorruptBlob?     ──► Err, nothing replaced
//!   ├─► verify + upgrade schema    SchemaMismatch?  ──► Err, nothing replaced
//!   └─► writer lock held:
//!         ├─► store.save(blob)     Storage?         ──► Err, nothing replaced
//!         └─► swap engine + snapshot
//! ```
//!
//! A backup is the same image the store holds, so restoring one written by
//! any SwiftBill build works as long as its tables verify.

use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::info;

use swiftbill_core::ValidationError;

use crate::database::Database;
use crate::engine::Engine;
use crate::error::{DbResult, StoreError};
use crate::schema;
use crate::store::{BlobStore, FileStore};

const BACKUP_DIR: &str = "backups";

/// File name for a backup taken today.
pub fn backup_file_name() -> String {
    format!("swiftbill-backup-{}.bin", Local::now().format("%Y-%m-%d"))
}

impl Database {
    /// Writes the committed blob to `<folder>/backups/` and returns the path.
    ///
    /// A second backup on the same day replaces the first.
    pub async fn backup_to_folder(&self, folder: impl AsRef<Path>) -> DbResult<PathBuf> {
        let path = folder.as_ref().join(BACKUP_DIR).join(backup_file_name());
        let blob = self.export_blob().await;

        FileStore::new(path.clone()).save(&blob).await?;
        info!(path = %path.display(), size = blob.len(), "Backup written");
        Ok(path)
    }

    /// Backs up into `settings.export_folder_path`.
    ///
    /// ## Returns
    /// * `Err(DbError::Validation)` - No export folder has been configured
    pub async fn backup_to_export_folder(&self) -> DbResult<PathBuf> {
        let folder = self.snapshot().settings.export_folder_path.clone();
        if folder.trim().is_empty() {
            return Err(ValidationError::required("export_folder_path").into());
        }
        self.backup_to_folder(folder).await
    }

    /// Replaces the whole database with `bytes`.
    ///
    /// The blob is fully validated and persisted before the running engine
    /// is swapped; on any error the current database is untouched.
    pub async fn restore(&self, bytes: &[u8]) -> DbResult<()> {
        info!(size = bytes.len(), "Restoring database");

        let engine = Engine::open(Some(bytes))?;
        schema::verify_schema(&engine)?;
        schema::upgrade_schema(&engine)?;
        let blob = engine.export()?;

        self.replace(engine, blob).await?;
        info!("Database restored");
        Ok(())
    }

    /// Reads a backup file and [`restore`](Self::restore)s it.
    pub async fn restore_from_file(&self, path: impl AsRef<Path>) -> DbResult<()> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| StoreError::io(path.display().to_string(), e))?;
        self.restore(&bytes).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
