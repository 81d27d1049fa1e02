//! # swiftbill-core: Pure Business Logic for SwiftBill
//!
//! Everything about an invoice that can be decided without touching the
//! database: amounts, GST, numbering, statements and validation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SwiftBill Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Frontend (forms, tables, PDF)                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    Desktop commands                             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ swiftbill-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌───────────┐ ┌─────────┐ │   │
//! │  │  │  types  │ │  money  │ │ invoice │ │ numbering │ │statement│ │   │
//! │  │  └─────────┘ └─────────┘ └─────────┘ └───────────┘ └─────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           swiftbill-db (blob store, SQLite, repositories)       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Client, Item, Invoice, Settings, Metrics)
//! - [`money`] - Money in paise with integer GST math
//! - [`invoice`] - Invoice draft builder and totals
//! - [`numbering`] - Next-invoice-number algorithm
//! - [`statement`] - Monthly statement aggregation
//! - [`validation`] - Input rules checked before every write
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use swiftbill_core::money::Money;
//! use swiftbill_core::numbering::next_invoice_number;
//! use swiftbill_core::types::TaxRate;
//!
//! let base = Money::from_whole_rupees(200);
//! assert_eq!(base.calculate_tax(TaxRate::from_bps(900)).paise(), 1800);
//!
//! assert_eq!(next_invoice_number("INV", 4, ["INV0001"]), "INV0002");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod invoice;
pub mod money;
pub mod numbering;
pub mod statement;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use invoice::{InvoiceDraft, InvoiceTotals};
pub use money::Money;
pub use statement::{MonthlyStatement, StatementTotals};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Invoice prefix used until the user picks their own.
pub const DEFAULT_INVOICE_PREFIX: &str = "INV";

/// Digit count of the invoice counter until the user changes it.
pub const DEFAULT_INVOICE_PADDING: u32 = 4;

/// Upper bound on invoice padding. Wider counters would never be filled.
pub const MAX_INVOICE_PADDING: u32 = 12;

/// Maximum quantity on a single invoice line
///
/// ## Business Reason
/// Catches slips like typing a GSTIN into the quantity field.
pub const MAX_LINE_QUANTITY: i64 = 1_000_000;
