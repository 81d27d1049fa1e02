//! # Invoice Builder
//!
//! Turns catalog items and quantities into a balanced [`Invoice`].
//!
//! ## Arithmetic
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  line.amount   = line.quantity × line.unit_price    (every edit)       │
//! │  base_amount   = Σ line.amount                                          │
//! │  cgst          = base_amount × cgst_percent / 100   (rounded, paise)    │
//! │  sgst          = base_amount × sgst_percent / 100   (rounded, paise)    │
//! │  total_amount  = base_amount + cgst + sgst                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tax is computed once on the base, not per line, so the two GST
//! components always match what the printed invoice shows.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Client, Invoice, Item, LineItem, Settings, TaxRate};
use crate::validation;

// =============================================================================
// Totals
// =============================================================================

/// Computed invoice totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceTotals {
    pub base_amount: Money,
    pub cgst: Money,
    pub sgst: Money,
    pub total_amount: Money,
}

impl InvoiceTotals {
    /// Computes totals for a set of lines at the given GST rates.
    ///
    /// Line amounts are re-derived from price and quantity, so a stale
    /// `amount` on an incoming line never leaks into the base.
    pub fn compute(lines: &[LineItem], cgst_rate: TaxRate, sgst_rate: TaxRate) -> Self {
        let base_amount: Money = lines.iter().map(LineItem::expected_amount).sum();
        let cgst = base_amount.calculate_tax(cgst_rate);
        let sgst = base_amount.calculate_tax(sgst_rate);

        InvoiceTotals {
            base_amount,
            cgst,
            sgst,
            total_amount: base_amount + cgst + sgst,
        }
    }
}

// =============================================================================
// Draft
// =============================================================================

/// An invoice being composed on the create/edit screen.
///
/// ## Usage
/// ```rust
/// use swiftbill_core::invoice::InvoiceDraft;
/// use swiftbill_core::{Client, Item, Money, Settings};
///
/// let settings = Settings::default();
/// let client = Client { id: 1, name: "Acme".into(), address: "1 Main St".into(), gstin: "GST1".into() };
/// let widget = Item { id: 1, description: "Widget".into(), hsn: "1234".into(), unit_price: Money::from_whole_rupees(100) };
///
/// let mut draft = InvoiceDraft::new("INV0001", "2024-03-05", &settings);
/// draft.set_client(&client);
/// let line = draft.add_item(&widget);
/// draft.set_quantity(line, 2.0).unwrap();
///
/// let invoice = draft.build().unwrap();
/// assert_eq!(invoice.total_amount, Money::from_whole_rupees(236));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDraft {
    /// Row id when editing a saved invoice.
    pub id: Option<i64>,
    pub invoice_no: String,
    pub bill_date: String,
    pub client_id: Option<i64>,
    pub company_name: String,
    pub vehicle_number: Option<String>,
    pub lines: Vec<LineItem>,
    pub cgst_rate: TaxRate,
    pub sgst_rate: TaxRate,
}

impl InvoiceDraft {
    /// Starts a new invoice using the tax rates from `settings`.
    pub fn new(invoice_no: impl Into<String>, bill_date: impl Into<String>, settings: &Settings) -> Self {
        InvoiceDraft {
            id: None,
            invoice_no: invoice_no.into(),
            bill_date: bill_date.into(),
            client_id: None,
            company_name: String::new(),
            vehicle_number: None,
            lines: Vec::new(),
            cgst_rate: settings.cgst_rate(),
            sgst_rate: settings.sgst_rate(),
        }
    }

    /// Reopens a saved invoice for editing.
    ///
    /// Fails with [`CoreError::MalformedLineItems`] when the stored lines
    /// cannot be decoded.
    pub fn from_invoice(invoice: &Invoice, settings: &Settings) -> CoreResult<Self> {
        Ok(InvoiceDraft {
            id: invoice.id,
            invoice_no: invoice.invoice_no.clone(),
            bill_date: invoice.bill_date.clone(),
            client_id: invoice.client_id,
            company_name: invoice.company_name.clone(),
            vehicle_number: invoice.vehicle_number.clone(),
            lines: invoice.line_items()?,
            cgst_rate: settings.cgst_rate(),
            sgst_rate: settings.sgst_rate(),
        })
    }

    /// Selects the billed client and snapshots its name.
    pub fn set_client(&mut self, client: &Client) {
        self.client_id = Some(client.id);
        self.company_name = client.name.clone();
    }

    /// Appends a catalog item with quantity 1 and returns its line index.
    pub fn add_item(&mut self, item: &Item) -> usize {
        self.lines.push(LineItem::from_item(item, 1.0));
        self.lines.len() - 1
    }

    /// Appends an already-built line, recomputing its amount.
    pub fn push_line(&mut self, mut line: LineItem) -> usize {
        line.recompute();
        self.lines.push(line);
        self.lines.len() - 1
    }

    pub fn set_quantity(&mut self, index: usize, quantity: f64) -> CoreResult<()> {
        validation::validate_quantity(quantity)?;
        let line = self.line_mut(index)?;
        line.quantity = quantity;
        line.recompute();
        Ok(())
    }

    pub fn set_unit_price(&mut self, index: usize, unit_price: Money) -> CoreResult<()> {
        validation::validate_unit_price(unit_price)?;
        let line = self.line_mut(index)?;
        line.unit_price = unit_price;
        line.recompute();
        Ok(())
    }

    /// Records the customer's purchase order against a line.
    pub fn set_purchase_order(
        &mut self,
        index: usize,
        po_no: impl Into<String>,
        po_date: impl Into<String>,
    ) -> CoreResult<()> {
        let line = self.line_mut(index)?;
        line.po_no = po_no.into();
        line.po_date = po_date.into();
        Ok(())
    }

    pub fn remove_line(&mut self, index: usize) -> CoreResult<LineItem> {
        if index >= self.lines.len() {
            return Err(CoreError::LineNotFound {
                index,
                len: self.lines.len(),
            });
        }
        Ok(self.lines.remove(index))
    }

    /// Current totals for the draft.
    pub fn totals(&self) -> InvoiceTotals {
        InvoiceTotals::compute(&self.lines, self.cgst_rate, self.sgst_rate)
    }

    /// Finalizes the draft into an [`Invoice`] ready to save.
    ///
    /// ## Errors
    /// - [`CoreError::ClientNotSelected`] when no client was chosen
    /// - [`CoreError::EmptyInvoice`] when there are no lines
    /// - [`CoreError::Validation`] for a blank invoice number or bad quantity
    pub fn build(mut self) -> CoreResult<Invoice> {
        validation::validate_invoice_no(&self.invoice_no)?;
        let client_id = self.client_id.ok_or(CoreError::ClientNotSelected)?;
        if self.lines.is_empty() {
            return Err(CoreError::EmptyInvoice);
        }
        for line in &mut self.lines {
            validation::validate_quantity(line.quantity)?;
            line.recompute();
        }

        let totals = self.totals();
        let items_json =
            serde_json::to_string(&self.lines).map_err(|e| CoreError::Encoding(e.to_string()))?;

        Ok(Invoice {
            id: self.id,
            invoice_no: self.invoice_no.trim().to_string(),
            bill_date: self.bill_date,
            client_id: Some(client_id),
            company_name: self.company_name,
            base_amount: totals.base_amount,
            cgst: totals.cgst,
            sgst: totals.sgst,
            total_amount: totals.total_amount,
            items_json,
            vehicle_number: self.vehicle_number.filter(|v| !v.trim().is_empty()),
        })
    }

    fn line_mut(&mut self, index: usize) -> CoreResult<&mut LineItem> {
        let len = self.lines.len();
        self.lines
            .get_mut(index)
            .ok_or(CoreError::LineNotFound { index, len })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn acme() -> Client {
        Client {
            id: 1,
            name: "Acme".to_string(),
            address: "1 Main St".to_string(),
            gstin: "GST1".to_string(),
        }
    }

    fn widget() -> Item {
        Item {
            id: 1,
            description: "Widget".to_string(),
            hsn: "1234".to_string(),
            unit_price: Money::from_whole_rupees(100),
        }
    }

    #[test]
    fn test_acme_widget_totals() {
        let mut draft = InvoiceDraft::new("INV0001", "2024-03-05", &Settings::default());
        draft.set_client(&acme());
        let line = draft.add_item(&widget());
        draft.set_quantity(line, 2.0).unwrap();

        let invoice = draft.build().unwrap();
        assert_eq!(invoice.base_amount, Money::from_whole_rupees(200));
        assert_eq!(invoice.cgst, Money::from_whole_rupees(18));
        assert_eq!(invoice.sgst, Money::from_whole_rupees(18));
        assert_eq!(invoice.total_amount, Money::from_whole_rupees(236));
        assert_eq!(invoice.company_name, "Acme");
        assert!(invoice.totals_balance());
    }

    #[test]
    fn test_line_amount_follows_edits() {
        let mut draft = InvoiceDraft::new("INV0001", "2024-03-05", &Settings::default());
        let line = draft.add_item(&widget());

        draft.set_unit_price(line, Money::from_paise(12_550)).unwrap();
        draft.set_quantity(line, 3.0).unwrap();
        assert_eq!(draft.lines[line].amount.paise(), 37_650);

        draft.set_quantity(line, 0.5).unwrap();
        assert_eq!(draft.lines[line].amount.paise(), 6_275);
    }

    #[test]
    fn test_stale_line_amount_is_ignored() {
        let mut stale = LineItem::from_item(&widget(), 2.0);
        stale.amount = Money::from_whole_rupees(999);

        let totals = InvoiceTotals::compute(&[stale], TaxRate::from_bps(900), TaxRate::from_bps(900));
        assert_eq!(totals.base_amount, Money::from_whole_rupees(200));
    }

    #[test]
    fn test_arithmetic_invariant_over_many_lines() {
        let mut draft = InvoiceDraft::new("INV0002", "2024-03-05", &Settings::default());
        draft.set_client(&acme());
        for (paise, qty) in [(199, 3.0), (1_005, 1.0), (33_333, 7.0), (1, 0.25)] {
            let idx = draft.add_item(&Item {
                unit_price: Money::from_paise(paise),
                ..widget()
            });
            draft.set_quantity(idx, qty).unwrap();
        }

        let invoice = draft.build().unwrap();
        let lines = invoice.line_items().unwrap();
        let base: Money = lines.iter().map(|l| l.amount).sum();

        assert_eq!(invoice.base_amount, base);
        for line in &lines {
            assert_eq!(line.amount, line.expected_amount());
        }
        assert!(invoice.totals_balance());
    }

    #[test]
    fn test_build_requires_client_and_lines() {
        let settings = Settings::default();

        let mut no_client = InvoiceDraft::new("INV0001", "2024-03-05", &settings);
        no_client.add_item(&widget());
        assert!(matches!(no_client.build(), Err(CoreError::ClientNotSelected)));

        let mut no_lines = InvoiceDraft::new("INV0001", "2024-03-05", &settings);
        no_lines.set_client(&acme());
        assert!(matches!(no_lines.build(), Err(CoreError::EmptyInvoice)));
    }

    #[test]
    fn test_bad_line_index() {
        let mut draft = InvoiceDraft::new("INV0001", "2024-03-05", &Settings::default());
        assert!(matches!(
            draft.set_quantity(0, 1.0),
            Err(CoreError::LineNotFound { index: 0, len: 0 })
        ));
        assert!(draft.remove_line(2).is_err());
    }

    #[test]
    fn test_reopen_saved_invoice() {
        let settings = Settings::default();
        let mut draft = InvoiceDraft::new("INV0003", "2024-03-05", &settings);
        draft.set_client(&acme());
        draft.add_item(&widget());
        draft.set_purchase_order(0, "PO-77", "2024-03-01").unwrap();
        let mut saved = draft.build().unwrap();
        saved.id = Some(3);

        let reopened = InvoiceDraft::from_invoice(&saved, &settings).unwrap();
        assert_eq!(reopened.id, Some(3));
        assert_eq!(reopened.lines[0].po_no, "PO-77");
        assert_eq!(reopened.totals().total_amount, saved.total_amount);
    }
}
