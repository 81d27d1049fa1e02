//! # Monthly Statement
//!
//! Filters invoices to one calendar month and sums their amounts.
//!
//! ```text
//! invoices ──► parse bill_date ──► month/year match? ──► Σ base, cgst, sgst, total
//!                   │
//!                   └── unparseable date ──► excluded
//! ```

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::Invoice;
use crate::validation::{self, ValidationResult};

/// Date formats accepted for `bill_date`, tried in order.
const BILL_DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y"];

/// Parses a stored bill date.
///
/// ## Example
/// ```rust
/// use swiftbill_core::statement::parse_bill_date;
///
/// assert!(parse_bill_date("2024-03-05").is_some());
/// assert!(parse_bill_date("05/03/2024").is_some());
/// assert!(parse_bill_date("March 5th").is_none());
/// ```
pub fn parse_bill_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    BILL_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Summed amounts for a statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StatementTotals {
    pub invoice_count: i64,
    pub base_amount: Money,
    pub cgst: Money,
    pub sgst: Money,
    pub total_amount: Money,
}

/// Invoices billed in one month, with their totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MonthlyStatement {
    pub month: u32,
    pub year: i32,
    pub invoices: Vec<Invoice>,
    pub totals: StatementTotals,
}

impl MonthlyStatement {
    /// Builds the statement for `month`/`year` from any set of invoices.
    ///
    /// Invoices keep their input order; callers pass the snapshot list,
    /// which is already newest first.
    pub fn build(month: u32, year: i32, invoices: &[Invoice]) -> ValidationResult<Self> {
        validation::validate_month(month)?;

        let selected: Vec<Invoice> = invoices
            .iter()
            .filter(|inv| {
                parse_bill_date(&inv.bill_date)
                    .is_some_and(|date| date.month() == month && date.year() == year)
            })
            .cloned()
            .collect();

        let totals = selected
            .iter()
            .fold(StatementTotals::default(), |mut acc, inv| {
                acc.invoice_count += 1;
                acc.base_amount += inv.base_amount;
                acc.cgst += inv.cgst;
                acc.sgst += inv.sgst;
                acc.total_amount += inv.total_amount;
                acc
            });

        Ok(MonthlyStatement {
            month,
            year,
            invoices: selected,
            totals,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice(no: &str, date: &str, base_rupees: i64) -> Invoice {
        let base = Money::from_whole_rupees(base_rupees);
        let tax = base.calculate_tax(crate::TaxRate::from_bps(900));
        Invoice {
            id: None,
            invoice_no: no.to_string(),
            bill_date: date.to_string(),
            client_id: Some(1),
            company_name: "Acme".to_string(),
            base_amount: base,
            cgst: tax,
            sgst: tax,
            total_amount: base + tax + tax,
            items_json: "[]".to_string(),
            vehicle_number: None,
        }
    }

    #[test]
    fn test_parse_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5);
        assert_eq!(parse_bill_date("2024-03-05"), expected);
        assert_eq!(parse_bill_date("05-03-2024"), expected);
        assert_eq!(parse_bill_date(" 05/03/2024 "), expected);
        assert_eq!(parse_bill_date(""), None);
    }

    #[test]
    fn test_statement_filters_and_sums() {
        let invoices = vec![
            invoice("INV0001", "2024-03-05", 200),
            invoice("INV0002", "2024-04-01", 100),
            invoice("INV0003", "31/03/2024", 100),
            invoice("INV0004", "2023-03-10", 500),
            invoice("INV0005", "garbage", 900),
        ];

        let statement = MonthlyStatement::build(3, 2024, &invoices).unwrap();
        assert_eq!(statement.invoices.len(), 2);
        assert_eq!(statement.totals.invoice_count, 2);
        assert_eq!(statement.totals.base_amount, Money::from_whole_rupees(300));
        assert_eq!(statement.totals.cgst, Money::from_whole_rupees(27));
        assert_eq!(statement.totals.total_amount, Money::from_whole_rupees(354));
    }

    #[test]
    fn test_empty_month() {
        let statement = MonthlyStatement::build(1, 2030, &[]).unwrap();
        assert!(statement.invoices.is_empty());
        assert_eq!(statement.totals, StatementTotals::default());
    }

    #[test]
    fn test_rejects_bad_month() {
        assert!(MonthlyStatement::build(13, 2024, &[]).is_err());
    }
}
