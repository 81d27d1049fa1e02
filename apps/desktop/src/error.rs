//! # API Error Type
//!
//! Unified error type for desktop commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in SwiftBill                              │
//! │                                                                         │
//! │  Frontend                    Rust Backend                               │
//! │  ────────                    ────────────                               │
//! │                                                                         │
//! │  invoke('save_invoice')                                                 │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Database Error? ─── DbError::UniqueViolation ──────┐           │  │
//! │  │         │                                           │           │  │
//! │  │         ▼                                           ▼           │  │
//! │  │  Validation Error? ─── CoreError::Validation ──── ApiError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  try {                                                                  │
//! │    await invoke('save_invoice', { invoice })                            │
//! │  } catch (e) {                                                          │
//! │    // e.code = "DUPLICATE" → regenerate the number and retry            │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use swiftbill_core::CoreError;
use swiftbill_db::DbError;

/// API error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Client not found: 42"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Client, item or invoice id does not exist
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Invoice number already used; the UI regenerates and retries
    Duplicate,

    /// Stored or supplied database is unreadable or of the wrong shape
    CorruptData,

    /// Reading or writing the database blob failed
    StorageError,

    /// Statement execution failed
    DatabaseError,

    /// Invoice could not be assembled (no client, no lines)
    BusinessLogic,

    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Duplicate,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ConstraintViolation(msg) => ApiError::validation(msg),
            DbError::Validation(e) => ApiError::validation(e.to_string()),
            err @ (DbError::SchemaMismatch { .. } | DbError::CorruptBlob(_)) => {
                tracing::error!(error = %err, "Unusable database image");
                ApiError::new(ErrorCode::CorruptData, err.to_string())
            }
            DbError::Storage(e) => {
                tracing::error!(error = %e, "Database storage failed");
                ApiError::new(ErrorCode::StorageError, e.to_string())
            }
            DbError::QueryFailed(e) | DbError::Decode(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
            CoreError::LineNotFound { .. } => ApiError::validation(err.to_string()),
            CoreError::ClientNotSelected | CoreError::EmptyInvoice => {
                ApiError::new(ErrorCode::BusinessLogic, err.to_string())
            }
            CoreError::MalformedLineItems(_) => {
                ApiError::new(ErrorCode::CorruptData, err.to_string())
            }
            CoreError::Encoding(ref e) => {
                tracing::error!("Line item encoding failed: {}", e);
                ApiError::internal(err.to_string())
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
