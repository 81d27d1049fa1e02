//! # Domain Types
//!
//! Core domain types used throughout SwiftBill.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Client      │   │      Item       │   │    Invoice      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (rowid)     │◄──┼─────────────────┼───│  client_id      │       │
//! │  │  name           │   │  description    │   │  invoice_no     │       │
//! │  │  address        │   │  hsn            │   │  base/cgst/sgst │       │
//! │  │  gstin          │   │  unit_price     │   │  items_json ──┐ │       │
//! │  └─────────────────┘   └────────┬────────┘   └───────────────┼─┘       │
//! │                                 │ snapshot                   │         │
//! │                                 ▼                            │         │
//! │                        ┌─────────────────┐                   │         │
//! │                        │    LineItem     │◄──────────────────┘         │
//! │                        │  frozen copy    │                             │
//! │                        └─────────────────┘                             │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Settings     │   │  SettingsPatch  │   │    Metrics      │       │
//! │  │  single row #1  │   │  partial update │   │  dashboard      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Rule
//! Invoices copy the client name and every line's description, HSN and price
//! at creation time. Editing a client or catalog item never rewrites history.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::{self, Money};

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 900 bps = 9% (the default CGST and SGST rate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a settings percentage (9.0 → 900 bps).
    ///
    /// Negative or non-finite percentages clamp to zero.
    pub fn from_percentage(pct: f64) -> Self {
        if !pct.is_finite() || pct <= 0.0 {
            return TaxRate(0);
        }
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Client
// =============================================================================

/// A customer that invoices are billed to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Client {
    /// Auto-assigned row id, immutable once created.
    pub id: i64,
    pub name: String,
    pub address: String,
    pub gstin: String,
}

/// Fields supplied when creating or editing a client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClientInput {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub gstin: String,
}

// =============================================================================
// Item
// =============================================================================

/// A catalog entry used to pre-fill invoice lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Item {
    pub id: i64,
    pub description: String,
    /// Harmonized System of Nomenclature code.
    pub hsn: String,
    pub unit_price: Money,
}

/// Fields supplied when creating or editing a catalog item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItemInput {
    pub description: String,
    #[serde(default)]
    pub hsn: String,
    #[serde(default)]
    pub unit_price: Money,
}

// =============================================================================
// Line Item Snapshot
// =============================================================================

/// One invoice line, frozen into `items_json` when the invoice is saved.
///
/// Money fields are written as rupee numbers so the JSON matches what the
/// invoice screen has always stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    /// Catalog item this line was copied from (None for ad-hoc lines).
    #[serde(default)]
    pub item_id: Option<i64>,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub hsn: String,

    #[serde(with = "money::rupees", default)]
    #[ts(type = "number")]
    pub unit_price: Money,

    /// Units sold; fractional for weight or length based goods.
    #[serde(default = "default_quantity")]
    pub quantity: f64,

    /// Customer purchase order number.
    #[serde(default)]
    pub po_no: String,

    #[serde(default)]
    pub po_date: String,

    /// `quantity × unit_price`, rounded to the paisa.
    #[serde(with = "money::rupees", default)]
    #[ts(type = "number")]
    pub amount: Money,
}

fn default_quantity() -> f64 {
    1.0
}

impl LineItem {
    /// Snapshots a catalog item into a new line.
    pub fn from_item(item: &Item, quantity: f64) -> Self {
        let mut line = LineItem {
            item_id: Some(item.id),
            description: item.description.clone(),
            hsn: item.hsn.clone(),
            unit_price: item.unit_price,
            quantity,
            po_no: String::new(),
            po_date: String::new(),
            amount: Money::zero(),
        };
        line.recompute();
        line
    }

    /// Quantity in thousandths of a unit.
    #[inline]
    pub fn quantity_milli(&self) -> i64 {
        if !self.quantity.is_finite() {
            return 0;
        }
        (self.quantity * 1000.0).round() as i64
    }

    /// The amount this line should carry for its current price and quantity.
    pub fn expected_amount(&self) -> Money {
        self.unit_price.multiply_milli(self.quantity_milli())
    }

    /// Recomputes `amount` from `unit_price` and `quantity`.
    pub fn recompute(&mut self) {
        self.amount = self.expected_amount();
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// A saved (or about to be saved) invoice.
///
/// `id` is `None` until the row is inserted; saving an invoice that has an
/// `id` updates that row instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Invoice {
    pub id: Option<i64>,
    pub invoice_no: String,
    /// Textual bill date as entered (normally `YYYY-MM-DD`).
    pub bill_date: String,
    pub client_id: Option<i64>,
    /// Client name at the time the invoice was made.
    pub company_name: String,
    pub base_amount: Money,
    pub cgst: Money,
    pub sgst: Money,
    pub total_amount: Money,
    /// Serialized `Vec<LineItem>`.
    pub items_json: String,
    pub vehicle_number: Option<String>,
}

impl Invoice {
    /// Decodes the line-item snapshots stored in `items_json`.
    ///
    /// An empty string is treated as an invoice without lines.
    pub fn line_items(&self) -> CoreResult<Vec<LineItem>> {
        if self.items_json.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&self.items_json)
            .map_err(|e| CoreError::MalformedLineItems(e.to_string()))
    }

    /// Checks `total_amount == base_amount + cgst + sgst`.
    #[inline]
    pub fn totals_balance(&self) -> bool {
        self.total_amount == self.base_amount + self.cgst + self.sgst
    }
}

// =============================================================================
// Settings
// =============================================================================

/// The single settings row (`id = 1`): company profile, numbering scheme
/// and tax defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Settings {
    pub company_name: String,
    pub address: String,
    pub gstin: String,
    pub phone: String,
    pub email: String,
    /// Company logo as a base64 data URL, empty when unset.
    pub logo_base64: String,
    pub invoice_prefix: String,
    /// Minimum digit count of the invoice sequence number.
    pub invoice_padding: u32,
    pub cgst_percent: f64,
    pub sgst_percent: f64,
    /// Folder that PDFs and backups are written to, empty when unset.
    pub export_folder_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            company_name: "Your Company".to_string(),
            address: "Your Address".to_string(),
            gstin: "Your GSTIN".to_string(),
            phone: "Your Phone".to_string(),
            email: "your@email.com".to_string(),
            logo_base64: String::new(),
            invoice_prefix: crate::DEFAULT_INVOICE_PREFIX.to_string(),
            invoice_padding: crate::DEFAULT_INVOICE_PADDING,
            cgst_percent: 9.0,
            sgst_percent: 9.0,
            export_folder_path: String::new(),
        }
    }
}

impl Settings {
    #[inline]
    pub fn cgst_rate(&self) -> TaxRate {
        TaxRate::from_percentage(self.cgst_percent)
    }

    #[inline]
    pub fn sgst_rate(&self) -> TaxRate {
        TaxRate::from_percentage(self.sgst_percent)
    }
}

/// Partial settings update. Absent fields keep their current value.
///
/// ## Example
/// ```rust
/// use swiftbill_core::{Settings, SettingsPatch};
///
/// let patch = SettingsPatch {
///     invoice_prefix: Some("BILL".to_string()),
///     ..Default::default()
/// };
/// let merged = patch.apply(&Settings::default());
/// assert_eq!(merged.invoice_prefix, "BILL");
/// assert_eq!(merged.company_name, "Your Company");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct SettingsPatch {
    pub company_name: Option<String>,
    pub address: Option<String>,
    pub gstin: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub logo_base64: Option<String>,
    pub invoice_prefix: Option<String>,
    pub invoice_padding: Option<u32>,
    pub cgst_percent: Option<f64>,
    pub sgst_percent: Option<f64>,
    pub export_folder_path: Option<String>,
}

impl SettingsPatch {
    /// Merges this patch over `current`, producing the full row to write.
    pub fn apply(self, current: &Settings) -> Settings {
        let base = current.clone();
        Settings {
            company_name: self.company_name.unwrap_or(base.company_name),
            address: self.address.unwrap_or(base.address),
            gstin: self.gstin.unwrap_or(base.gstin),
            phone: self.phone.unwrap_or(base.phone),
            email: self.email.unwrap_or(base.email),
            logo_base64: self.logo_base64.unwrap_or(base.logo_base64),
            invoice_prefix: self.invoice_prefix.unwrap_or(base.invoice_prefix),
            invoice_padding: self.invoice_padding.unwrap_or(base.invoice_padding),
            cgst_percent: self.cgst_percent.unwrap_or(base.cgst_percent),
            sgst_percent: self.sgst_percent.unwrap_or(base.sgst_percent),
            export_folder_path: self.export_folder_path.unwrap_or(base.export_folder_path),
        }
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == SettingsPatch::default()
    }
}

// =============================================================================
// Metrics
// =============================================================================

/// Dashboard aggregates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Metrics {
    pub total_revenue: Money,
    pub total_invoices: i64,
    pub total_clients: i64,
    pub avg_invoice_value: Money,
}

impl Metrics {
    /// Builds metrics from raw aggregates; the average is zero when there
    /// are no invoices.
    pub fn from_totals(total_revenue: Money, total_invoices: i64, total_clients: i64) -> Self {
        Metrics {
            total_revenue,
            total_invoices,
            total_clients,
            avg_invoice_value: total_revenue.divide_rounded(total_invoices),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
