//! # Error Types
//!
//! Domain-specific error types for swiftbill-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  swiftbill-core errors (this file)                                     │
//! │  ├── CoreError        - Invoice building and decoding failures         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  swiftbill-db errors (separate crate)                                  │
//! │  ├── StoreError       - Blob load/save failures                        │
//! │  └── DbError          - Engine, schema and repository failures         │
//! │                                                                         │
//! │  Desktop API errors (in app)                                           │
//! │  └── ApiError         - What the frontend sees (serialized)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError/DbError → ApiError → Frontend       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// `items_json` on a stored invoice is not a valid line-item array.
    ///
    /// ## When This Occurs
    /// - The blob was edited by hand or written by a broken build
    /// - A line carries a non-numeric price or quantity
    ///
    /// Display code treats such an invoice as having zero lines.
    #[error("Invoice line items could not be decoded: {0}")]
    MalformedLineItems(String),

    /// Line index passed to the invoice builder is out of bounds.
    #[error("Line {index} does not exist (invoice has {len} lines)")]
    LineNotFound { index: usize, len: usize },

    /// An invoice was finalized before a client was chosen.
    #[error("Select a client before saving the invoice")]
    ClientNotSelected,

    /// An invoice was finalized with no lines.
    #[error("Invoice must contain at least one line item")]
    EmptyInvoice,

    /// Line items could not be serialized into `items_json`.
    #[error("Failed to encode line items: {0}")]
    Encoding(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Invalid format (e.g., non-numeric padding, bad date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Stored totals disagree with each other.
    #[error("{field} does not add up: {reason}")]
    Inconsistent { field: String, reason: String },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
