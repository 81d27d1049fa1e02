//! # Invoice Commands
//!
//! ## Save Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  InvoicePayload (form contents)                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  InvoiceDraft: client snapshot, lines recomputed, totals from settings  │
//! │       │                                                                 │
//! │       ├── invoiceNo given ───► invoices().save()                        │
//! │       │                        UNIQUE clash → ApiError DUPLICATE        │
//! │       │                                                                 │
//! │       └── invoiceNo blank ───► invoices().create_numbered()             │
//! │                                next number claimed in the same write    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  InvoiceDto (amounts in paise, decoded lines, current client name)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

use swiftbill_core::{Invoice, InvoiceDraft, LineItem, Metrics, Money, MonthlyStatement};
use swiftbill_db::Snapshot;

use crate::error::ApiError;
use crate::state::DbState;

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemDto {
    pub item_id: Option<i64>,
    pub description: String,
    pub hsn: String,
    pub unit_price_paise: i64,
    pub quantity: f64,
    pub po_no: String,
    pub po_date: String,
    pub amount_paise: i64,
}

impl From<LineItem> for LineItemDto {
    fn from(l: LineItem) -> Self {
        LineItemDto {
            item_id: l.item_id,
            description: l.description,
            hsn: l.hsn,
            unit_price_paise: l.unit_price.paise(),
            quantity: l.quantity,
            po_no: l.po_no,
            po_date: l.po_date,
            amount_paise: l.amount.paise(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDto {
    pub id: Option<i64>,
    pub invoice_no: String,
    pub bill_date: String,
    pub client_id: Option<i64>,
    /// Billed name as stored on the invoice.
    pub company_name: String,
    /// Current name of the linked client; blank once the client is deleted.
    pub client_name: String,
    pub base_amount_paise: i64,
    pub cgst_paise: i64,
    pub sgst_paise: i64,
    pub total_amount_paise: i64,
    pub vehicle_number: Option<String>,
    pub items: Vec<LineItemDto>,
}

impl InvoiceDto {
    /// Builds the DTO, resolving the client name against `snapshot`.
    ///
    /// Unreadable `items_json` shows as an invoice with no lines.
    pub fn from_invoice(invoice: Invoice, snapshot: &Snapshot) -> Self {
        let items = match invoice.line_items() {
            Ok(lines) => lines.into_iter().map(LineItemDto::from).collect(),
            Err(e) => {
                warn!(invoice_no = %invoice.invoice_no, error = %e, "Showing invoice without lines");
                Vec::new()
            }
        };

        InvoiceDto {
            client_name: snapshot.client_name(invoice.client_id).to_string(),
            id: invoice.id,
            invoice_no: invoice.invoice_no,
            bill_date: invoice.bill_date,
            client_id: invoice.client_id,
            company_name: invoice.company_name,
            base_amount_paise: invoice.base_amount.paise(),
            cgst_paise: invoice.cgst.paise(),
            sgst_paise: invoice.sgst.paise(),
            total_amount_paise: invoice.total_amount.paise(),
            vehicle_number: invoice.vehicle_number,
            items,
        }
    }
}

/// One line of the invoice form; prices in rupees.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinePayload {
    #[serde(default)]
    pub item_id: Option<i64>,
    pub description: String,
    #[serde(default)]
    pub hsn: String,
    pub unit_price: f64,
    pub quantity: f64,
    #[serde(default)]
    pub po_no: String,
    #[serde(default)]
    pub po_date: String,
}

/// Invoice form contents.
///
/// A blank `invoice_no` on a new invoice means "assign the next number".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePayload {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub invoice_no: Option<String>,
    pub bill_date: String,
    pub client_id: i64,
    #[serde(default)]
    pub vehicle_number: Option<String>,
    pub lines: Vec<LinePayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsDto {
    pub total_revenue_paise: i64,
    pub total_invoices: i64,
    pub total_clients: i64,
    pub avg_invoice_value_paise: i64,
}

impl From<Metrics> for MetricsDto {
    fn from(m: Metrics) -> Self {
        MetricsDto {
            total_revenue_paise: m.total_revenue.paise(),
            total_invoices: m.total_invoices,
            total_clients: m.total_clients,
            avg_invoice_value_paise: m.avg_invoice_value.paise(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementDto {
    pub month: u32,
    pub year: i32,
    pub invoices: Vec<InvoiceDto>,
    pub invoice_count: i64,
    pub base_amount_paise: i64,
    pub cgst_paise: i64,
    pub sgst_paise: i64,
    pub total_amount_paise: i64,
}

impl StatementDto {
    fn from_statement(statement: MonthlyStatement, snapshot: &Snapshot) -> Self {
        StatementDto {
            month: statement.month,
            year: statement.year,
            invoice_count: statement.totals.invoice_count,
            base_amount_paise: statement.totals.base_amount.paise(),
            cgst_paise: statement.totals.cgst.paise(),
            sgst_paise: statement.totals.sgst.paise(),
            total_amount_paise: statement.totals.total_amount.paise(),
            invoices: statement
                .invoices
                .into_iter()
                .map(|inv| InvoiceDto::from_invoice(inv, snapshot))
                .collect(),
        }
    }
}

// =============================================================================
// Commands
// =============================================================================

/// All invoices, newest bill date first.
pub async fn list_invoices(state: &DbState) -> Result<Vec<InvoiceDto>, ApiError> {
    let snapshot = state.inner().snapshot();
    debug!(count = snapshot.invoices.len(), "list_invoices command");
    Ok(snapshot
        .invoices
        .iter()
        .cloned()
        .map(|inv| InvoiceDto::from_invoice(inv, &snapshot))
        .collect())
}

pub async fn get_invoice(state: &DbState, id: i64) -> Result<InvoiceDto, ApiError> {
    let snapshot = state.inner().snapshot();
    let invoice = snapshot
        .invoice(id)
        .cloned()
        .ok_or_else(|| ApiError::not_found("Invoice", id))?;
    Ok(InvoiceDto::from_invoice(invoice, &snapshot))
}

/// Number the invoice form pre-fills.
pub async fn next_invoice_number(state: &DbState) -> Result<String, ApiError> {
    Ok(state.inner().invoices().generate_number().await?)
}

/// Creates or updates an invoice from form contents.
///
/// ## Returns
/// * `Err(ApiError { code: NOT_FOUND })` - Unknown client, or editing an
///   invoice that no longer exists
/// * `Err(ApiError { code: DUPLICATE })` - The typed number is taken
/// * `Err(ApiError { code: BUSINESS_LOGIC })` - No lines
pub async fn save_invoice(
    state: &DbState,
    payload: InvoicePayload,
) -> Result<InvoiceDto, ApiError> {
    let start = Instant::now();
    let db = state.inner();
    let snapshot = db.snapshot();

    let client = snapshot
        .client(payload.client_id)
        .ok_or_else(|| ApiError::not_found("Client", payload.client_id))?;

    let typed_no = payload
        .invoice_no
        .map(|no| no.trim().to_string())
        .filter(|no| !no.is_empty());

    let (invoice_no, claim_number) = match (payload.id, typed_no) {
        (_, Some(no)) => (no, false),
        (None, None) => ("pending".to_string(), true),
        // Editing without a number keeps the stored one
        (Some(id), None) => {
            let existing = snapshot
                .invoice(id)
                .ok_or_else(|| ApiError::not_found("Invoice", id))?;
            (existing.invoice_no.clone(), false)
        }
    };

    let mut draft = InvoiceDraft::new(invoice_no, payload.bill_date, &snapshot.settings);
    draft.id = payload.id;
    draft.set_client(client);
    draft.vehicle_number = payload.vehicle_number;
    for line in payload.lines {
        draft.push_line(LineItem {
            item_id: line.item_id,
            description: line.description,
            hsn: line.hsn,
            unit_price: Money::from_rupees(line.unit_price),
            quantity: line.quantity,
            po_no: line.po_no,
            po_date: line.po_date,
            amount: Money::zero(),
        });
    }
    let invoice = draft.build()?;

    let saved = if claim_number {
        db.invoices().create_numbered(invoice).await?
    } else {
        db.invoices().save(invoice).await?
    };

    info!(
        invoice_no = %saved.invoice_no,
        total = %saved.total_amount,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Invoice saved"
    );
    Ok(InvoiceDto::from_invoice(saved, &db.snapshot()))
}

pub async fn delete_invoice(state: &DbState, id: i64) -> Result<bool, ApiError> {
    Ok(state.inner().invoices().delete(id).await?)
}

/// Dashboard figures.
pub async fn get_metrics(state: &DbState) -> Result<MetricsDto, ApiError> {
    Ok(state.inner().metrics().load().await?.into())
}

/// Invoices billed in `month` (1-12) of `year`, with totals.
pub async fn monthly_statement(
    state: &DbState,
    month: u32,
    year: i32,
) -> Result<StatementDto, ApiError> {
    let db = state.inner();
    let statement = db.invoices().statement(month, year)?;
    Ok(StatementDto::from_statement(statement, &db.snapshot()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::client::add_client;
    use crate::error::ErrorCode;
    use crate::{bootstrap, AppConfig};
    use swiftbill_core::ClientInput;

    async fn setup() -> (DbState, i64) {
        let state = bootstrap(&AppConfig::memory()).await.unwrap();
        let client = add_client(
            &state,
            ClientInput {
                name: "Acme".to_string(),
                address: "1 Main St".to_string(),
                gstin: "GST1".to_string(),
            },
        )
        .await
        .unwrap();
        (state, client.id)
    }

    fn widget_form(client_id: i64, invoice_no: Option<&str>) -> InvoicePayload {
        InvoicePayload {
            id: None,
            invoice_no: invoice_no.map(str::to_string),
            bill_date: "2024-03-05".to_string(),
            client_id,
            vehicle_number: None,
            lines: vec![LinePayload {
                item_id: None,
                description: "Widget".to_string(),
                hsn: "1234".to_string(),
                unit_price: 100.0,
                quantity: 2.0,
                ..Default::default()
            }],
        }
    }

    #[tokio::test]
    async fn test_save_with_generated_number() {
        let (state, client_id) = setup().await;
        assert_eq!(next_invoice_number(&state).await.unwrap(), "INV0001");

        let saved = save_invoice(&state, widget_form(client_id, None))
            .await
            .unwrap();
        assert_eq!(saved.invoice_no, "INV0001");
        assert_eq!(saved.base_amount_paise, 20_000);
        assert_eq!(saved.cgst_paise, 1_800);
        assert_eq!(saved.sgst_paise, 1_800);
        assert_eq!(saved.total_amount_paise, 23_600);
        assert_eq!(saved.client_name, "Acme");
        assert_eq!(saved.items.len(), 1);
        assert_eq!(saved.items[0].amount_paise, 20_000);

        let metrics = get_metrics(&state).await.unwrap();
        assert_eq!(metrics.total_revenue_paise, 23_600);
        assert_eq!(metrics.total_invoices, 1);
        assert_eq!(metrics.total_clients, 1);
    }

    #[tokio::test]
    async fn test_typed_duplicate_number() {
        let (state, client_id) = setup().await;
        save_invoice(&state, widget_form(client_id, Some("INV0001")))
            .await
            .unwrap();

        let err = save_invoice(&state, widget_form(client_id, Some("INV0001")))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Duplicate);
        assert_eq!(list_invoices(&state).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_edit_keeps_number_and_statement() {
        let (state, client_id) = setup().await;
        let saved = save_invoice(&state, widget_form(client_id, None))
            .await
            .unwrap();

        let mut form = widget_form(client_id, None);
        form.id = saved.id;
        form.lines[0].quantity = 3.0;
        let edited = save_invoice(&state, form).await.unwrap();
        assert_eq!(edited.invoice_no, saved.invoice_no);
        assert_eq!(edited.total_amount_paise, 35_400);

        let statement = monthly_statement(&state, 3, 2024).await.unwrap();
        assert_eq!(statement.invoice_count, 1);
        assert_eq!(statement.total_amount_paise, 35_400);
        assert_eq!(monthly_statement(&state, 4, 2024).await.unwrap().invoice_count, 0);

        let err = monthly_statement(&state, 13, 2024).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_unknown_client_and_empty_lines() {
        let (state, client_id) = setup().await;
        let err = save_invoice(&state, widget_form(999, None)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let mut form = widget_form(client_id, None);
        form.lines.clear();
        let err = save_invoice(&state, form).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
    }

    #[tokio::test]
    async fn test_malformed_lines_show_empty() {
        let (state, _) = setup().await;
        let db = state.inner();
        let invoice = Invoice {
            id: None,
            invoice_no: "OLD1".to_string(),
            bill_date: "05/03/2024".to_string(),
            client_id: None,
            company_name: "Legacy".to_string(),
            base_amount: Money::from_whole_rupees(10),
            cgst: Money::zero(),
            sgst: Money::zero(),
            total_amount: Money::from_whole_rupees(10),
            items_json: "{not json".to_string(),
            vehicle_number: None,
        };
        let saved = db.invoices().save(invoice).await.unwrap();

        let dto = get_invoice(&state, saved.id.unwrap()).await.unwrap();
        assert!(dto.items.is_empty());
        assert_eq!(dto.client_name, "");
        assert!(delete_invoice(&state, saved.id.unwrap()).await.unwrap());
    }
}
