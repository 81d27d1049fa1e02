//! # Application Configuration
//!
//! Where the database lives, decided once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`SWIFTBILL_*`)
//! 2. Platform data directory
//!
//! Business settings (company name, prefix, tax rates) are not configured
//! here; they live in the database `settings` row.

use directories::ProjectDirs;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use swiftbill_db::{DbConfig, MemoryKeyValue, DATABASE_FILE_NAME};

use crate::error::ApiError;

/// Key used for the in-process local storage backend.
pub const DEFAULT_STORAGE_KEY: &str = "swiftbill";

/// Which backend holds the database blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum StorageMode {
    /// A file on disk (desktop default).
    File { path: PathBuf },

    /// In-process key/value storage, lost on exit. Used for demos and tests.
    Memory { key: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub storage: StorageMode,
}

impl AppConfig {
    /// Builds configuration from the environment.
    ///
    /// ## Environment Variables
    /// - `SWIFTBILL_STORAGE`: `file` (default) or `memory`
    /// - `SWIFTBILL_DB_PATH`: database file path override
    /// - `SWIFTBILL_STORAGE_KEY`: key for `memory` storage
    ///
    /// ## Platform-Specific Paths
    /// - **macOS**: `~/Library/Application Support/com.swiftbill.swiftbill/swiftbill.db`
    /// - **Windows**: `%APPDATA%\swiftbill\swiftbill\data\swiftbill.db`
    /// - **Linux**: `~/.local/share/swiftbill/swiftbill.db`
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let mode = var("SWIFTBILL_STORAGE").unwrap_or_else(|| "file".to_string());

        let storage = match mode.trim().to_ascii_lowercase().as_str() {
            "file" => {
                let path = match var("SWIFTBILL_DB_PATH") {
                    Some(path) if !path.trim().is_empty() => PathBuf::from(path),
                    _ => default_database_path()?,
                };
                StorageMode::File { path }
            }
            "memory" => StorageMode::Memory {
                key: var("SWIFTBILL_STORAGE_KEY")
                    .filter(|key| !key.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string()),
            },
            other => {
                return Err(ApiError::validation(format!(
                    "SWIFTBILL_STORAGE must be 'file' or 'memory', got '{}'",
                    other
                )))
            }
        };

        Ok(AppConfig { storage })
    }

    /// Configuration for a database file at `path`.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        AppConfig {
            storage: StorageMode::File { path: path.into() },
        }
    }

    /// Configuration for a fresh in-process store.
    pub fn memory() -> Self {
        AppConfig {
            storage: StorageMode::Memory {
                key: DEFAULT_STORAGE_KEY.to_string(),
            },
        }
    }

    /// Database configuration for this storage mode.
    pub fn db_config(&self) -> DbConfig {
        match &self.storage {
            StorageMode::File { path } => DbConfig::file(path),
            StorageMode::Memory { key } => {
                DbConfig::local_storage(Arc::new(MemoryKeyValue::new()), key.clone())
            }
        }
    }
}

/// `<platform data dir>/swiftbill.db`, creating the directory if needed.
fn default_database_path() -> Result<PathBuf, ApiError> {
    let proj_dirs = ProjectDirs::from("com", "swiftbill", "swiftbill")
        .ok_or_else(|| ApiError::internal("Could not determine app data directory"))?;

    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir).map_err(|e| {
        ApiError::internal(format!(
            "Could not create {}: {}",
            data_dir.display(),
            e
        ))
    })?;

    Ok(data_dir.join(DATABASE_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_db_path_override() {
        let config =
            AppConfig::from_lookup(lookup(&[("SWIFTBILL_DB_PATH", "/tmp/bills.db")])).unwrap();
        assert_eq!(
            config.storage,
            StorageMode::File {
                path: PathBuf::from("/tmp/bills.db")
            }
        );
    }

    #[test]
    fn test_memory_storage_with_key() {
        let config = AppConfig::from_lookup(lookup(&[
            ("SWIFTBILL_STORAGE", "Memory"),
            ("SWIFTBILL_STORAGE_KEY", "demo"),
        ]))
        .unwrap();
        assert_eq!(
            config.storage,
            StorageMode::Memory {
                key: "demo".to_string()
            }
        );

        let config = AppConfig::from_lookup(lookup(&[("SWIFTBILL_STORAGE", "memory")])).unwrap();
        assert_eq!(config.storage, AppConfig::memory().storage);
    }

    #[test]
    fn test_unknown_storage_mode_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("SWIFTBILL_STORAGE", "cloud")])).unwrap_err();
        assert!(err.message.contains("cloud"));
    }
}
