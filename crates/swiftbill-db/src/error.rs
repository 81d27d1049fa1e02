//! # Database Error Types
//!
//! Error types for storage and database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  BlobStore (file / local storage)       SQLite (rusqlite::Error)       │
//! │       │                                       │                         │
//! │       ▼                                       ▼                         │
//! │  StoreError ───────────────► DbError (this module) ◄── ValidationError  │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │                      ApiError (desktop) ← Serialized for frontend      │
//! │                                                                         │
//! │  StoreError::NotFound on load is NOT a failure: it means first run     │
//! │  and triggers schema creation.                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rusqlite::ffi;
use swiftbill_core::ValidationError;
use thiserror::Error;

// =============================================================================
// Store Error
// =============================================================================

/// Failures of a [`BlobStore`](crate::store::BlobStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// No blob has been saved yet at this location.
    #[error("No database stored at {location}")]
    NotFound { location: String },

    /// Reading or writing the blob failed.
    ///
    /// ## When This Occurs
    /// - Permission denied on the database file
    /// - Disk full while writing the temp file
    /// - Local storage quota exceeded
    /// - Zero-length database file
    #[error("Storage I/O failed for {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    /// The stored value exists but is not a byte array.
    #[error("Stored database at {location} is not readable: {reason}")]
    Encoding { location: String, reason: String },
}

impl StoreError {
    pub fn io(location: impl Into<String>, source: std::io::Error) -> Self {
        StoreError::Io {
            location: location.into(),
            source,
        }
    }

    /// True for the first-run case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Result type for blob store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Database Error
// =============================================================================

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - Updating a client/item/invoice id that does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Saving an invoice whose `invoice_no` is already taken. Callers
    ///   regenerate the number and retry.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Any other constraint failure (NOT NULL, CHECK).
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// A stored blob is missing tables or columns the repositories read.
    #[error("Schema mismatch in {table}: {reason}")]
    SchemaMismatch { table: String, reason: String },

    /// Bytes handed to the engine are not an SQLite database.
    #[error("Database blob is corrupt: {0}")]
    CorruptBlob(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A column could not be converted to its Rust type.
    #[error("Failed to decode row: {0}")]
    Decode(String),

    /// Loading or saving the blob failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// Input rejected before reaching the engine.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Fills in the offending value on a UniqueViolation.
    ///
    /// SQLite only reports the column, so repositories attach the value
    /// they tried to write.
    pub fn with_duplicate_value(self, value: &str) -> Self {
        match self {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, value),
            other => other,
        }
    }

    /// True for the first-run "nothing stored yet" case.
    pub fn is_not_found_in_storage(&self) -> bool {
        matches!(self, DbError::Storage(err) if err.is_not_found())
    }
}

/// Convert rusqlite errors to DbError.
///
/// ## Error Mapping
/// ```text
/// SqliteFailure(CONSTRAINT_UNIQUE)      → DbError::UniqueViolation
/// SqliteFailure(other constraint)       → DbError::ConstraintViolation
/// SqliteFailure(NOTADB / CORRUPT)       → DbError::CorruptBlob
/// SqliteFailure(other)                  → DbError::QueryFailed
/// QueryReturnedNoRows                   → DbError::NotFound
/// FromSqlConversionFailure, column type → DbError::Decode
/// Other                                 → DbError::Internal
/// ```
impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(code, msg) => {
                let msg = msg.unwrap_or_else(|| code.to_string());
                match code.code {
                    rusqlite::ErrorCode::ConstraintViolation
                        if code.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                            || code.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
                    {
                        // "UNIQUE constraint failed: invoices.invoice_no"
                        let field = msg
                            .split("constraint failed: ")
                            .nth(1)
                            .unwrap_or("unknown")
                            .to_string();
                        DbError::UniqueViolation {
                            field,
                            value: "unknown".to_string(),
                        }
                    }
                    rusqlite::ErrorCode::ConstraintViolation => DbError::ConstraintViolation(msg),
                    rusqlite::ErrorCode::NotADatabase | rusqlite::ErrorCode::DatabaseCorrupt => {
                        DbError::CorruptBlob(msg)
                    }
                    _ => DbError::QueryFailed(msg),
                }
            }

            rusqlite::Error::QueryReturnedNoRows => DbError::not_found("Record", "unknown"),

            rusqlite::Error::FromSqlConversionFailure(_, _, _)
            | rusqlite::Error::InvalidColumnType(_, _, _)
            | rusqlite::Error::InvalidColumnIndex(_)
            | rusqlite::Error::InvalidColumnName(_)
            | rusqlite::Error::IntegralValueOutOfRange(_, _) => DbError::Decode(err.to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================
