//! # Metrics Repository
//!
//! Dashboard aggregates computed in SQL. The snapshot keeps a copy that is
//! refreshed whenever clients or invoices change.

use swiftbill_core::{Metrics, Money};

use crate::database::Database;
use crate::engine::Engine;
use crate::error::DbResult;

#[derive(Debug, Clone)]
pub struct MetricsRepository {
    db: Database,
}

impl MetricsRepository {
    pub fn new(db: Database) -> Self {
        MetricsRepository { db }
    }

    /// Revenue, invoice and client counts, and the average invoice value
    /// (zero when there are no invoices).
    pub async fn load(&self) -> DbResult<Metrics> {
        self.db.read(compute).await
    }
}

pub(crate) fn compute(engine: &Engine) -> DbResult<Metrics> {
    // Summing paise avoids accumulating REAL rounding error
    let (revenue_paise, invoice_count) = engine
        .query_row(
            "SELECT COALESCE(SUM(ROUND(total_amount * 100)), 0), COUNT(*) FROM invoices",
            [],
            |row| Ok((row.get::<_, f64>(0)?, row.get::<_, i64>(1)?)),
        )?
        .unwrap_or((0.0, 0));

    let client_count = engine
        .query_row("SELECT COUNT(*) FROM clients", [], |row| row.get::<_, i64>(0))?
        .unwrap_or(0);

    Ok(Metrics::from_totals(
        Money::from_paise(revenue_paise.round() as i64),
        invoice_count,
        client_count,
    ))
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use swiftbill_core::{ClientInput, Invoice, Money};

    fn invoice(no: &str, total_rupees: i64) -> Invoice {
        Invoice {
            id: None,
            invoice_no: no.to_string(),
            bill_date: "2024-03-05".to_string(),
            client_id: None,
            company_name: String::new(),
            base_amount: Money::from_whole_rupees(total_rupees),
            cgst: Money::zero(),
            sgst: Money::zero(),
            total_amount: Money::from_whole_rupees(total_rupees),
            items_json: String::new(),
            vehicle_number: None,
        }
    }

    #[tokio::test]
    async fn test_empty_database_average_is_zero() {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();
        let metrics = db.metrics().load().await.unwrap();

        assert_eq!(metrics.total_invoices, 0);
        assert_eq!(metrics.total_revenue, Money::zero());
        assert_eq!(metrics.avg_invoice_value, Money::zero());
    }

    #[tokio::test]
    async fn test_revenue_count_and_average() {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();
        for (no, total) in [("INV0001", 100), ("INV0002", 200), ("INV0003", 300)] {
            db.invoices().save(invoice(no, total)).await.unwrap();
        }
        db.clients()
            .add(ClientInput {
                name: "Acme".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let metrics = db.metrics().load().await.unwrap();
        assert_eq!(metrics.total_revenue, Money::from_whole_rupees(600));
        assert_eq!(metrics.total_invoices, 3);
        assert_eq!(metrics.total_clients, 1);
        assert_eq!(metrics.avg_invoice_value, Money::from_whole_rupees(200));
        assert_eq!(db.snapshot().metrics, metrics);
    }

    #[tokio::test]
    async fn test_fractional_totals_sum_exactly() {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();
        for (i, paise) in [10_i64, 20, 30].into_iter().enumerate() {
            let mut inv = invoice(&format!("INV{:04}", i + 1), 0);
            inv.base_amount = Money::from_paise(paise);
            inv.total_amount = Money::from_paise(paise);
            db.invoices().save(inv).await.unwrap();
        }

        let metrics = db.metrics().load().await.unwrap();
        assert_eq!(metrics.total_revenue, Money::from_paise(60));
        assert_eq!(metrics.avg_invoice_value, Money::from_paise(20));
    }
}
