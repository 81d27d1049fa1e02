//! # Schema Manager
//!
//! The fixed four-table schema and the checks run against stored blobs.
//!
//! ## When Each Function Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  store.load()                                                          │
//! │     │                                                                   │
//! │     ├── NotFound ──► create_schema()  (DDL + settings row #1)          │
//! │     │                  then persist immediately                        │
//! │     │                                                                   │
//! │     └── bytes ─────► verify_schema()  (read-only, no DDL)              │
//! │                        │                                                │
//! │                        └─► upgrade_schema()                            │
//! │                              adds invoices.vehicle_number to blobs     │
//! │                              written before the column existed         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no migration table. The schema is fixed; the one additive
//! column is detected from `pragma_table_info`.

use tracing::{debug, info};

use crate::engine::Engine;
use crate::error::{DbError, DbResult};

const SCHEMA_SQL: &str = include_str!("../sql/schema.sql");

/// Columns every repository reads, per table.
pub const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("clients", &["id", "name", "address", "gstin"]),
    ("items", &["id", "description", "hsn", "unit_price"]),
    (
        "invoices",
        &[
            "id",
            "invoice_no",
            "bill_date",
            "client_id",
            "company_name",
            "base_amount",
            "cgst",
            "sgst",
            "total_amount",
            "items_json",
        ],
    ),
    (
        "settings",
        &[
            "id",
            "company_name",
            "address",
            "gstin",
            "phone",
            "email",
            "logo_base64",
            "invoice_prefix",
            "invoice_padding",
            "cgst_percent",
            "sgst_percent",
            "export_folder_path",
        ],
    ),
];

/// Creates all tables and seeds the settings row.
///
/// Idempotent, but only expected to run on a fresh engine.
pub fn create_schema(engine: &Engine) -> DbResult<()> {
    info!("Creating database schema");
    engine.execute_batch(SCHEMA_SQL)
}

/// Checks that a loaded blob has every table and column the repositories
/// read.
///
/// ## Returns
/// * `Err(DbError::SchemaMismatch)` - A table or column is missing
pub fn verify_schema(engine: &Engine) -> DbResult<()> {
    for (table, columns) in REQUIRED_COLUMNS {
        if !engine.table_exists(table)? {
            return Err(DbError::SchemaMismatch {
                table: table.to_string(),
                reason: "table is missing".to_string(),
            });
        }

        let present = engine.column_names(table)?;
        if let Some(missing) = columns.iter().find(|c| !present.iter().any(|p| p == *c)) {
            return Err(DbError::SchemaMismatch {
                table: table.to_string(),
                reason: format!("column '{}' is missing", missing),
            });
        }
    }

    debug!("Schema verified");
    Ok(())
}

/// Adds columns introduced after the first release.
///
/// ## Returns
/// * `Ok(true)` - The engine changed and should be persisted
/// * `Ok(false)` - Already current
pub fn upgrade_schema(engine: &Engine) -> DbResult<bool> {
    let columns = engine.column_names("invoices")?;
    if columns.iter().any(|c| c == "vehicle_number") {
        return Ok(false);
    }

    info!("Adding invoices.vehicle_number to stored database");
    engine.execute_batch("ALTER TABLE invoices ADD COLUMN vehicle_number TEXT;")?;
    Ok(true)
}

// =============================================================================
// Unit Tests
// =============================================================================
