//! # Settings Commands
//!
//! Settings travel with their column names (`invoice_prefix`,
//! `cgst_percent`, ...) so the settings form binds fields one to one.

use std::path::PathBuf;
use tracing::info;

use swiftbill_core::{Settings, SettingsPatch};

use crate::error::ApiError;
use crate::state::DbState;

pub async fn get_settings(state: &DbState) -> Result<Settings, ApiError> {
    Ok(state.inner().settings().current())
}

/// Applies the fields present in `patch` and returns the full row.
pub async fn update_settings(
    state: &DbState,
    patch: SettingsPatch,
) -> Result<Settings, ApiError> {
    if patch.is_empty() {
        return Ok(state.inner().settings().current());
    }
    let settings = state.inner().settings().update(patch).await?;
    info!(prefix = %settings.invoice_prefix, "Settings updated");
    Ok(settings)
}

/// Writes a dated backup into `folder`, or into the configured export
/// folder when `folder` is `None`. Returns the backup file path.
pub async fn backup_database(
    state: &DbState,
    folder: Option<String>,
) -> Result<String, ApiError> {
    let db = state.inner();
    let path: PathBuf = match folder.filter(|f| !f.trim().is_empty()) {
        Some(folder) => db.backup_to_folder(folder).await?,
        None => db.backup_to_export_folder().await?,
    };
    Ok(path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::{bootstrap, AppConfig};

    #[tokio::test]
    async fn test_partial_update_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::file(dir.path().join("swiftbill.db"));

        let state = bootstrap(&config).await.unwrap();
        let updated = update_settings(
            &state,
            SettingsPatch {
                company_name: Some("Acme Billing".to_string()),
                cgst_percent: Some(6.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.company_name, "Acme Billing");
        assert_eq!(updated.invoice_prefix, "INV");
        drop(state);

        let state = bootstrap(&config).await.unwrap();
        let settings = get_settings(&state).await.unwrap();
        assert_eq!(settings.company_name, "Acme Billing");
        assert_eq!(settings.cgst_percent, 6.0);
        assert_eq!(settings.sgst_percent, 9.0);
    }

    #[tokio::test]
    async fn test_invalid_patch_rejected() {
        let state = bootstrap(&AppConfig::memory()).await.unwrap();
        let err = update_settings(
            &state,
            SettingsPatch {
                invoice_prefix: Some("  ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(get_settings(&state).await.unwrap().invoice_prefix, "INV");
    }

    #[tokio::test]
    async fn test_backup_needs_a_folder() {
        let state = bootstrap(&AppConfig::memory()).await.unwrap();
        let err = backup_database(&state, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let dir = tempfile::tempdir().unwrap();
        let path = backup_database(&state, Some(dir.path().display().to_string()))
            .await
            .unwrap();
        assert!(std::path::Path::new(&path).exists());
    }
}
