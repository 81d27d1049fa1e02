//! # File Store
//!
//! Desktop backend: the blob is a plain SQLite file on disk.
//!
//! ## Atomic Replace
//! ```text
//! save(bytes)
//!   │
//!   ├─► create_dir_all(parent)
//!   ├─► write  swiftbill.db.<nanos>.tmp
//!   ├─► fsync  swiftbill.db.<nanos>.tmp
//!   └─► rename swiftbill.db.<nanos>.tmp ──► swiftbill.db
//!
//! A reader sees either the old file or the new one, never half of either.
//! ```

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::BlobStore;
use crate::error::{StoreError, StoreResult};

/// Blob store backed by a single file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn temp_path(&self) -> StoreResult<PathBuf> {
        let file_name = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                StoreError::io(
                    self.location(),
                    std::io::Error::new(ErrorKind::InvalidInput, "database path has no file name"),
                )
            })?;

        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();

        Ok(self.path.with_file_name(format!("{}.{}.tmp", file_name, nanos)))
    }

    async fn write_temp(&self, temp: &Path, blob: &[u8]) -> std::io::Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(temp)
            .await?;
        file.write_all(blob).await?;
        file.sync_all().await?;
        Ok(())
    }
}

#[async_trait]
impl BlobStore for FileStore {
    async fn load(&self) -> StoreResult<Vec<u8>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Err(StoreError::io(
                self.location(),
                std::io::Error::new(ErrorKind::InvalidData, "database file is empty"),
            )),
            Ok(bytes) => {
                debug!(path = %self.path.display(), size = bytes.len(), "Read database file");
                Ok(bytes)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound {
                location: self.location(),
            }),
            Err(e) => Err(StoreError::io(self.location(), e)),
        }
    }

    async fn save(&self, blob: &[u8]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(self.location(), e))?;
        }

        let temp = self.temp_path()?;

        if let Err(e) = self.write_temp(&temp, blob).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(StoreError::io(self.location(), e));
        }

        if let Err(e) = tokio::fs::rename(&temp, &self.path).await {
            warn!(temp = %temp.display(), error = %e, "Rename over database file failed");
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(StoreError::io(self.location(), e));
        }

        debug!(path = %self.path.display(), size = blob.len(), "Wrote database file");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
