//! # Invoice Repository
//!
//! Saving and deleting invoices, issuing invoice numbers and monthly
//! statements.
//!
//! ## Numbering Race
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  generate_number() + save()          create_numbered()                 │
//! │  ──────────────────────────          ─────────────────                  │
//! │  lock ─ scan ─ unlock                lock                              │
//! │  (user fills the form)                 scan → INV0008                  │
//! │  lock ─ INSERT INV0008 ─ unlock        INSERT INV0008                  │
//! │         │                              persist                         │
//! │         └─ another save took it?     unlock                            │
//! │            UNIQUE rejects it:                                          │
//! │            DbError::UniqueViolation, caller regenerates                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `generate_number` is what the invoice form shows as a preview;
//! `create_numbered` claims the number and inserts in one writer turn.

use rusqlite::{params, Row};
use tracing::{debug, warn};

use swiftbill_core::numbering::next_invoice_number;
use swiftbill_core::validation::validate_invoice;
use swiftbill_core::{Invoice, Money, MonthlyStatement};

use crate::database::Database;
use crate::engine::Engine;
use crate::error::{DbError, DbResult};
use crate::repository::settings::read_settings;
use crate::snapshot::Collection;

const SELECT_INVOICES: &str = "
    SELECT id, invoice_no, bill_date, client_id, company_name,
           base_amount, cgst, sgst, total_amount, items_json, vehicle_number
    FROM invoices";

/// Repository for invoice operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    db: Database,
}

impl InvoiceRepository {
    pub fn new(db: Database) -> Self {
        InvoiceRepository { db }
    }

    /// All invoices, newest bill date first.
    pub fn list(&self) -> Vec<Invoice> {
        self.db.snapshot().invoices.clone()
    }

    pub fn get(&self, id: i64) -> Option<Invoice> {
        self.db.snapshot().invoice(id).cloned()
    }

    /// Inserts or updates an invoice.
    ///
    /// ## Behavior
    /// - `invoice.id == None`: INSERT, the returned invoice carries the new id
    /// - `invoice.id == Some(id)`: UPDATE of that row
    ///
    /// Amounts are stored as given; they must already balance
    /// (`total = base + cgst + sgst`), which [`InvoiceDraft`] guarantees.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - `invoice_no` already used; generate
    ///   a new number and retry
    /// * `Err(DbError::NotFound)` - Updating an id that does not exist
    /// * `Err(DbError::Validation)` - Blank number, negative or unbalanced amounts
    ///
    /// [`InvoiceDraft`]: swiftbill_core::InvoiceDraft
    pub async fn save(&self, invoice: Invoice) -> DbResult<Invoice> {
        validate_invoice(&invoice)?;
        debug!(
            invoice_no = %invoice.invoice_no,
            id = ?invoice.id,
            total = %invoice.total_amount,
            "Saving invoice"
        );

        self.db
            .mutate(&[Collection::Invoices], move |engine| write_invoice(engine, invoice))
            .await
            .map_err(|e| {
                warn!(error = %e, "Invoice save failed");
                e
            })
    }

    /// Assigns the next invoice number and inserts, in one writer turn.
    ///
    /// Whatever `invoice_no` the invoice carries is replaced.
    pub async fn create_numbered(&self, mut invoice: Invoice) -> DbResult<Invoice> {
        invoice.id = None;

        self.db
            .mutate(&[Collection::Invoices], move |engine| {
                invoice.invoice_no = next_number(engine)?;
                validate_invoice(&invoice)?;
                debug!(invoice_no = %invoice.invoice_no, "Claimed invoice number");
                write_invoice(engine, invoice)
            })
            .await
    }

    /// Hard-deletes an invoice. Returns `false` when it was already absent.
    pub async fn delete(&self, id: i64) -> DbResult<bool> {
        debug!(id = %id, "Deleting invoice");

        self.db
            .mutate(&[Collection::Invoices], move |engine| {
                Ok(engine.execute("DELETE FROM invoices WHERE id = ?1", [id])? > 0)
            })
            .await
    }

    /// Next number under the current prefix and padding.
    ///
    /// ## Algorithm
    /// 1. Select numbers whose leading characters equal the prefix
    ///    (`substr`, not `LIKE`, so `_` and `%` in a prefix are literal)
    /// 2. Keep those whose remainder is all digits
    /// 3. `max + 1`, or 1 when none qualify, zero-padded to the padding
    ///
    /// ## Example
    /// ```rust,ignore
    /// // settings: prefix "INV", padding 4; stored: INV0001, INV0002, OLD0050
    /// assert_eq!(db.invoices().generate_number().await?, "INV0003");
    /// ```
    pub async fn generate_number(&self) -> DbResult<String> {
        self.db.read(next_number).await
    }

    /// Invoices billed in `month`/`year` and their totals.
    pub fn statement(&self, month: u32, year: i32) -> DbResult<MonthlyStatement> {
        let snapshot = self.db.snapshot();
        Ok(MonthlyStatement::build(month, year, &snapshot.invoices)?)
    }
}

fn write_invoice(engine: &Engine, mut invoice: Invoice) -> DbResult<Invoice> {
    let duplicate = |e: DbError| e.with_duplicate_value(&invoice.invoice_no);

    match invoice.id {
        None => {
            engine
                .execute(
                    "INSERT INTO invoices (
                        invoice_no, bill_date, client_id, company_name,
                        base_amount, cgst, sgst, total_amount, items_json, vehicle_number
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    params![
                        invoice.invoice_no,
                        invoice.bill_date,
                        invoice.client_id,
                        invoice.company_name,
                        invoice.base_amount.to_rupees(),
                        invoice.cgst.to_rupees(),
                        invoice.sgst.to_rupees(),
                        invoice.total_amount.to_rupees(),
                        invoice.items_json,
                        invoice.vehicle_number,
                    ],
                )
                .map_err(duplicate)?;
            invoice.id = Some(engine.last_insert_rowid());
        }
        Some(id) => {
            let changed = engine
                .execute(
                    "UPDATE invoices SET
                        invoice_no = ?2, bill_date = ?3, client_id = ?4, company_name = ?5,
                        base_amount = ?6, cgst = ?7, sgst = ?8, total_amount = ?9,
                        items_json = ?10, vehicle_number = ?11
                    WHERE id = ?1",
                    params![
                        id,
                        invoice.invoice_no,
                        invoice.bill_date,
                        invoice.client_id,
                        invoice.company_name,
                        invoice.base_amount.to_rupees(),
                        invoice.cgst.to_rupees(),
                        invoice.sgst.to_rupees(),
                        invoice.total_amount.to_rupees(),
                        invoice.items_json,
                        invoice.vehicle_number,
                    ],
                )
                .map_err(duplicate)?;
            if changed == 0 {
                return Err(DbError::not_found("Invoice", id));
            }
        }
    }

    Ok(invoice)
}

/// Scans the stored numbers under the current prefix.
pub(crate) fn next_number(engine: &Engine) -> DbResult<String> {
    let settings = read_settings(engine)?;
    let prefix = settings.invoice_prefix;
    let prefix_len = prefix.chars().count() as i64;

    let candidates: Vec<String> = engine.query(
        "SELECT invoice_no FROM invoices WHERE substr(invoice_no, 1, ?1) = ?2",
        params![prefix_len, prefix],
        |row| row.get(0),
    )?;

    let next = next_invoice_number(&prefix, settings.invoice_padding, &candidates);
    debug!(prefix = %prefix, scanned = candidates.len(), next = %next, "Generated invoice number");
    Ok(next)
}

pub(crate) fn load_all(engine: &Engine) -> DbResult<Vec<Invoice>> {
    engine.query(
        &format!("{SELECT_INVOICES} ORDER BY bill_date DESC, id DESC"),
        [],
        map_invoice,
    )
}

fn map_invoice(row: &Row<'_>) -> rusqlite::Result<Invoice> {
    let money = |column: &str| -> rusqlite::Result<Money> {
        Ok(Money::from_rupees(row.get::<_, Option<f64>>(column)?.unwrap_or(0.0)))
    };

    let base_amount = money("base_amount")?;
    let cgst = money("cgst")?;
    let sgst = money("sgst")?;

    Ok(Invoice {
        id: Some(row.get("id")?),
        invoice_no: row.get::<_, Option<String>>("invoice_no")?.unwrap_or_default(),
        bill_date: row.get::<_, Option<String>>("bill_date")?.unwrap_or_default(),
        client_id: row.get("client_id")?,
        company_name: row.get::<_, Option<String>>("company_name")?.unwrap_or_default(),
        base_amount,
        cgst,
        sgst,
        total_amount: reconcile_total(money("total_amount")?, base_amount + cgst + sgst),
        items_json: row.get::<_, Option<String>>("items_json")?.unwrap_or_default(),
        vehicle_number: row.get("vehicle_number")?,
    })
}

/// Older builds stored unrounded GST (`0.9045`). Rounding each column to
/// paise separately can leave the total one paisa off its components, so
/// within that margin the components win and the row saves again as is.
fn reconcile_total(stored: Money, components: Money) -> Money {
    if (stored.paise() - components.paise()).abs() <= 1 {
        components
    } else {
        stored
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
