//! # Host Bridge
//!
//! Raw byte transport between the UI and the host: reading the stored
//! database, replacing it, and writing arbitrary exports (PDFs, backups)
//! to a chosen path.
//!
//! ```text
//! ┌──────────────────────┐          ┌────────────────────────────────────┐
//! │ UI                   │          │ Host                               │
//! │                      │  bytes   │                                    │
//! │ readDatabaseFile()  ◄├──────────┤ store.load()                       │
//! │ writeDatabaseFile() ─┼─────────►│ Database::restore (verify, swap)   │
//! │ exportDatabase()    ─┼─────────►│ mkdir -p parent, write file        │
//! └──────────────────────┘          └────────────────────────────────────┘
//! ```
//!
//! Failures are reported inside [`BridgeResponse`] rather than as
//! [`ApiError`](crate::ApiError), matching the host's callback shape.

use serde::Serialize;
use std::fmt::Display;
use std::path::Path;
use tracing::{error, info};

use crate::state::DbState;

/// `{ success, data?, error? }` envelope for bridge calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> BridgeResponse<T> {
    pub fn ok(data: T) -> Self {
        BridgeResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(err: impl Display) -> Self {
        BridgeResponse {
            success: false,
            data: None,
            error: Some(err.to_string()),
        }
    }
}

impl BridgeResponse<()> {
    fn done() -> Self {
        BridgeResponse {
            success: true,
            data: None,
            error: None,
        }
    }
}

/// The database bytes as currently persisted.
pub async fn read_database_file(state: &DbState) -> BridgeResponse<Vec<u8>> {
    match state.inner().store().load().await {
        Ok(bytes) => BridgeResponse::ok(bytes),
        Err(e) => {
            error!(error = %e, "read_database_file failed");
            BridgeResponse::failed(e)
        }
    }
}

/// Replaces the database with `data`.
///
/// The bytes must open as a SwiftBill database; otherwise nothing changes.
pub async fn write_database_file(state: &DbState, data: Vec<u8>) -> BridgeResponse<()> {
    match state.inner().restore(&data).await {
        Ok(()) => BridgeResponse::done(),
        Err(e) => {
            error!(error = %e, size = data.len(), "write_database_file failed");
            BridgeResponse::failed(e)
        }
    }
}

/// Writes `data` to `path`, creating missing parent folders.
pub async fn export_database(data: Vec<u8>, path: String) -> BridgeResponse<String> {
    match write_export(&data, Path::new(&path)).await {
        Ok(()) => {
            info!(path = %path, size = data.len(), "Exported file");
            BridgeResponse::ok(path)
        }
        Err(e) => {
            error!(path = %path, error = %e, "export_database failed");
            BridgeResponse::failed(format!("{}: {}", path, e))
        }
    }
}

async fn write_export(data: &[u8], path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, data).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bootstrap, AppConfig};
    use swiftbill_core::ClientInput;

    #[tokio::test]
    async fn test_read_then_write_back() {
        let state = bootstrap(&AppConfig::memory()).await.unwrap();
        let before = read_database_file(&state).await;
        assert!(before.success);
        let snapshot = before.data.unwrap();

        state
            .inner()
            .clients()
            .add(ClientInput {
                name: "Acme".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let response = write_database_file(&state, snapshot).await;
        assert_eq!(response, BridgeResponse::done());
        assert!(state.inner().clients().list().is_empty());
    }

    #[tokio::test]
    async fn test_write_rejects_garbage() {
        let state = bootstrap(&AppConfig::memory()).await.unwrap();
        let response = write_database_file(&state, vec![7; 4096]).await;

        assert!(!response.success);
        assert!(response.error.is_some());
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("data").is_none());
    }

    #[tokio::test]
    async fn test_export_creates_parent_folders() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pdf").join("2024").join("INV0001.pdf");

        let response = export_database(b"%PDF-1.4".to_vec(), path.display().to_string()).await;
        assert!(response.success);
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4");
    }
}
