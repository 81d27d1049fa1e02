//! # Settings Repository
//!
//! The single settings row (`id = 1`).
//!
//! ```text
//! update(patch) ──► patch.apply(current) ──► validate ──► UPDATE all 11 columns
//!                        ▲
//!                        └── snapshot.settings
//! ```
//!
//! Reads are forgiving: a NULL column, an empty prefix or a zero padding
//! falls back to the default for that field, and a missing row yields
//! [`Settings::default`]. A zero tax percentage is a legitimate value and
//! is kept.

use rusqlite::{params, Row};
use tracing::{debug, warn};

use swiftbill_core::validation::validate_settings;
use swiftbill_core::{Settings, SettingsPatch};

use crate::database::Database;
use crate::engine::Engine;
use crate::error::DbResult;
use crate::snapshot::Collection;

/// Repository for the settings row.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    db: Database,
}

impl SettingsRepository {
    pub fn new(db: Database) -> Self {
        SettingsRepository { db }
    }

    /// Settings as of the last commit.
    pub fn current(&self) -> Settings {
        self.db.snapshot().settings.clone()
    }

    /// Reads the row from the engine, applying defaults to missing values.
    pub async fn load(&self) -> DbResult<Settings> {
        self.db.read(read_settings).await
    }

    /// Merges `patch` over the current settings and writes the full row.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let patch = SettingsPatch { invoice_prefix: Some("BILL".into()), ..Default::default() };
    /// let settings = db.settings().update(patch).await?;
    /// assert_eq!(settings.invoice_prefix, "BILL");
    /// ```
    ///
    /// ## Returns
    /// * `Ok(Settings)` - The merged row as stored
    /// * `Err(DbError::Validation)` - Empty prefix, padding outside 1-12,
    ///   tax percentage outside 0-100
    pub async fn update(&self, patch: SettingsPatch) -> DbResult<Settings> {
        let merged = patch.apply(&self.current());
        validate_settings(&merged)?;
        debug!(
            prefix = %merged.invoice_prefix,
            padding = merged.invoice_padding,
            "Updating settings"
        );

        self.db
            .mutate(&[Collection::Settings], move |engine| {
                write_settings(engine, &merged)?;
                Ok(merged)
            })
            .await
    }
}

fn write_settings(engine: &Engine, settings: &Settings) -> DbResult<()> {
    let values = params![
        settings.company_name,
        settings.address,
        settings.gstin,
        settings.phone,
        settings.email,
        settings.logo_base64,
        settings.invoice_prefix,
        settings.invoice_padding,
        settings.cgst_percent,
        settings.sgst_percent,
        settings.export_folder_path,
    ];

    let changed = engine.execute(
        "UPDATE settings SET
            company_name = ?1, address = ?2, gstin = ?3, phone = ?4, email = ?5,
            logo_base64 = ?6, invoice_prefix = ?7, invoice_padding = ?8,
            cgst_percent = ?9, sgst_percent = ?10, export_folder_path = ?11
        WHERE id = 1",
        values,
    )?;

    if changed == 0 {
        warn!("Settings row missing, inserting it");
        engine.execute(
            "INSERT INTO settings (
                id, company_name, address, gstin, phone, email, logo_base64,
                invoice_prefix, invoice_padding, cgst_percent, sgst_percent, export_folder_path
            ) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            values,
        )?;
    }

    Ok(())
}

/// Reads row 1, falling back to defaults field by field.
pub(crate) fn read_settings(engine: &Engine) -> DbResult<Settings> {
    let row = engine.query_row(
        "SELECT company_name, address, gstin, phone, email, logo_base64,
                invoice_prefix, invoice_padding, cgst_percent, sgst_percent, export_folder_path
         FROM settings WHERE id = 1",
        [],
        map_settings,
    )?;

    Ok(row.unwrap_or_else(|| {
        warn!("Settings row missing, using defaults");
        Settings::default()
    }))
}

fn map_settings(row: &Row<'_>) -> rusqlite::Result<Settings> {
    let defaults = Settings::default();
    let text = |column: &str, fallback: String| -> rusqlite::Result<String> {
        Ok(row.get::<_, Option<String>>(column)?.unwrap_or(fallback))
    };

    let invoice_prefix = text("invoice_prefix", defaults.invoice_prefix.clone())?;
    let invoice_padding = row
        .get::<_, Option<i64>>("invoice_padding")?
        .and_then(|p| u32::try_from(p).ok())
        .filter(|p| *p > 0)
        .unwrap_or(defaults.invoice_padding);

    Ok(Settings {
        company_name: text("company_name", defaults.company_name)?,
        address: text("address", defaults.address)?,
        gstin: text("gstin", defaults.gstin)?,
        phone: text("phone", defaults.phone)?,
        email: text("email", defaults.email)?,
        logo_base64: text("logo_base64", defaults.logo_base64)?,
        invoice_prefix: if invoice_prefix.is_empty() {
            defaults.invoice_prefix
        } else {
            invoice_prefix
        },
        invoice_padding,
        cgst_percent: row
            .get::<_, Option<f64>>("cgst_percent")?
            .unwrap_or(defaults.cgst_percent),
        sgst_percent: row
            .get::<_, Option<f64>>("sgst_percent")?
            .unwrap_or(defaults.sgst_percent),
        export_folder_path: text("export_folder_path", defaults.export_folder_path)?,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
