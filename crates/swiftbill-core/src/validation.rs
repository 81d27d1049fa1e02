//! # Validation Module
//!
//! Input validation for SwiftBill records.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend forms                                               │
//! │  └── Empty fields, immediate feedback                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Repository (Rust)                                            │
//! │  └── THIS MODULE: runs before any statement touches the engine         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                       │
//! │  ├── NOT NULL (clients.name, items.description)                        │
//! │  └── UNIQUE (invoices.invoice_no)                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use swiftbill_core::validation::{validate_invoice_prefix, validate_quantity};
//!
//! assert!(validate_invoice_prefix("INV").is_ok());
//! assert!(validate_quantity(0.0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{ClientInput, Invoice, ItemInput, Settings};
use crate::{MAX_INVOICE_PADDING, MAX_LINE_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn require(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

fn limit(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

/// Validates a client before insert or update.
///
/// ## Rules
/// - `name` is required (1-200 characters)
/// - `address` at most 500 characters
/// - `gstin` at most 20 characters (15 for a real GSTIN, with slack for
///   placeholders like "Your GSTIN")
pub fn validate_client(client: &ClientInput) -> ValidationResult<()> {
    require("name", &client.name, 200)?;
    limit("address", &client.address, 500)?;
    limit("gstin", &client.gstin, 20)?;
    Ok(())
}

/// Validates a catalog item before insert or update.
pub fn validate_item(item: &ItemInput) -> ValidationResult<()> {
    require("description", &item.description, 300)?;
    limit("hsn", &item.hsn, 20)?;
    validate_unit_price(item.unit_price)?;
    Ok(())
}

/// Validates an invoice number (non-empty, at most 50 characters).
pub fn validate_invoice_no(invoice_no: &str) -> ValidationResult<()> {
    require("invoice_no", invoice_no, 50)
}

/// Validates an invoice before it is written.
///
/// The repository stores the caller's totals verbatim; this only rejects
/// an invoice whose total disagrees with its own components.
pub fn validate_invoice(invoice: &Invoice) -> ValidationResult<()> {
    validate_invoice_no(&invoice.invoice_no)?;

    for (field, amount) in [
        ("base_amount", invoice.base_amount),
        ("cgst", invoice.cgst),
        ("sgst", invoice.sgst),
    ] {
        if amount.is_negative() {
            return Err(ValidationError::Negative {
                field: field.to_string(),
            });
        }
    }

    if !invoice.totals_balance() {
        return Err(ValidationError::Inconsistent {
            field: "total_amount".to_string(),
            reason: format!(
                "{} != {} + {} + {}",
                invoice.total_amount, invoice.base_amount, invoice.cgst, invoice.sgst
            ),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be a finite number greater than zero
/// - Must not exceed [`MAX_LINE_QUANTITY`]
pub fn validate_quantity(qty: f64) -> ValidationResult<()> {
    if !qty.is_finite() || qty <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY as f64 {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a unit price. Zero is allowed (free samples).
pub fn validate_unit_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: "unit_price".to_string(),
        });
    }
    Ok(())
}

/// Validates a GST percentage (0-100 inclusive).
pub fn validate_tax_percent(field: &str, pct: f64) -> ValidationResult<()> {
    if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 100,
        });
    }
    Ok(())
}

/// Validates the invoice number prefix.
///
/// ## Rules
/// - Non-empty, at most 20 characters
/// - No whitespace
pub fn validate_invoice_prefix(prefix: &str) -> ValidationResult<()> {
    if prefix.is_empty() {
        return Err(ValidationError::required("invoice_prefix"));
    }

    limit("invoice_prefix", prefix, 20)?;

    if prefix.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "invoice_prefix".to_string(),
            reason: "must not contain spaces".to_string(),
        });
    }

    Ok(())
}

/// Validates the invoice number padding (1 to [`MAX_INVOICE_PADDING`]).
pub fn validate_invoice_padding(padding: u32) -> ValidationResult<()> {
    if padding == 0 || padding > MAX_INVOICE_PADDING {
        return Err(ValidationError::OutOfRange {
            field: "invoice_padding".to_string(),
            min: 1,
            max: MAX_INVOICE_PADDING as i64,
        });
    }
    Ok(())
}

/// Validates a full settings row before it replaces the stored one.
pub fn validate_settings(settings: &Settings) -> ValidationResult<()> {
    limit("company_name", &settings.company_name, 200)?;
    validate_invoice_prefix(&settings.invoice_prefix)?;
    validate_invoice_padding(settings.invoice_padding)?;
    validate_tax_percent("cgst_percent", settings.cgst_percent)?;
    validate_tax_percent("sgst_percent", settings.sgst_percent)?;
    Ok(())
}

/// Validates a statement month (1-12).
pub fn validate_month(month: u32) -> ValidationResult<()> {
    if !(1..=12).contains(&month) {
        return Err(ValidationError::OutOfRange {
            field: "month".to_string(),
            min: 1,
            max: 12,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_client() {
        let ok = ClientInput {
            name: "Acme".to_string(),
            address: "1 Main St".to_string(),
            gstin: "GST1".to_string(),
        };
        assert!(validate_client(&ok).is_ok());

        let blank = ClientInput {
            name: "   ".to_string(),
            ..ok.clone()
        };
        assert_eq!(
            validate_client(&blank),
            Err(ValidationError::required("name"))
        );
    }

    #[test]
    fn test_validate_item() {
        let mut item = ItemInput {
            description: "Widget".to_string(),
            hsn: "1234".to_string(),
            unit_price: Money::zero(),
        };
        assert!(validate_item(&item).is_ok());

        item.unit_price = Money::from_paise(-1);
        assert!(matches!(
            validate_item(&item),
            Err(ValidationError::Negative { .. })
        ));

        item.unit_price = Money::zero();
        item.description.clear();
        assert!(validate_item(&item).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1.0).is_ok());
        assert!(validate_quantity(0.25).is_ok());
        assert!(validate_quantity(0.0).is_err());
        assert!(validate_quantity(-2.0).is_err());
        assert!(validate_quantity(f64::NAN).is_err());
        assert!(validate_quantity(MAX_LINE_QUANTITY as f64 + 1.0).is_err());
    }

    #[test]
    fn test_validate_prefix() {
        assert!(validate_invoice_prefix("INV").is_ok());
        assert!(validate_invoice_prefix("SB/24-").is_ok());
        assert!(validate_invoice_prefix("").is_err());
        assert!(validate_invoice_prefix("INV 1").is_err());
        assert!(validate_invoice_prefix(&"X".repeat(21)).is_err());
    }

    #[test]
    fn test_validate_padding() {
        assert!(validate_invoice_padding(4).is_ok());
        assert!(validate_invoice_padding(0).is_err());
        assert!(validate_invoice_padding(MAX_INVOICE_PADDING + 1).is_err());
    }

    #[test]
    fn test_validate_settings() {
        let mut settings = Settings::default();
        assert!(validate_settings(&settings).is_ok());

        settings.cgst_percent = 140.0;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_validate_invoice_rejects_unbalanced_total() {
        let mut invoice = Invoice {
            id: None,
            invoice_no: "INV0001".to_string(),
            bill_date: "2024-03-05".to_string(),
            client_id: Some(1),
            company_name: "Acme".to_string(),
            base_amount: Money::from_whole_rupees(200),
            cgst: Money::from_whole_rupees(18),
            sgst: Money::from_whole_rupees(18),
            total_amount: Money::from_whole_rupees(236),
            items_json: "[]".to_string(),
            vehicle_number: None,
        };
        assert!(validate_invoice(&invoice).is_ok());

        invoice.total_amount = Money::from_whole_rupees(240);
        assert!(matches!(
            validate_invoice(&invoice),
            Err(ValidationError::Inconsistent { .. })
        ));
    }

    #[test]
    fn test_validate_month() {
        assert!(validate_month(1).is_ok());
        assert!(validate_month(12).is_ok());
        assert!(validate_month(0).is_err());
        assert!(validate_month(13).is_err());
    }
}
