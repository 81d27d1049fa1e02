//! End-to-end flows against real stores, including process restarts
//! (a restart is a second `Database::open` on the same store).

use std::sync::Arc;

use swiftbill_core::{ClientInput, InvoiceDraft, ItemInput, Money, SettingsPatch};
use swiftbill_db::{Database, DbConfig, DbError, Engine, KeyValueStorage, MemoryKeyValue};

fn acme() -> ClientInput {
    ClientInput {
        name: "Acme".to_string(),
        address: "1 Main St".to_string(),
        gstin: "GST1".to_string(),
    }
}

fn widget() -> ItemInput {
    ItemInput {
        description: "Widget".to_string(),
        hsn: "1234".to_string(),
        unit_price: Money::from_whole_rupees(100),
    }
}

#[tokio::test]
async fn acme_widget_invoice_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("swiftbill.db");

    let db = Database::open(DbConfig::file(&path)).await.unwrap();
    assert!(path.exists(), "fresh database is persisted on open");

    let client = db.clients().add(acme()).await.unwrap();
    let item = db.items().add(widget()).await.unwrap();

    let number = db.invoices().generate_number().await.unwrap();
    assert_eq!(number, "INV0001");

    let settings = db.settings().current();
    let mut draft = InvoiceDraft::new(number, "2024-03-05", &settings);
    draft.set_client(&client);
    let line = draft.add_item(&item);
    draft.set_quantity(line, 2.0).unwrap();

    let saved = db.invoices().save(draft.build().unwrap()).await.unwrap();
    assert_eq!(saved.base_amount, Money::from_whole_rupees(200));
    assert_eq!(saved.cgst, Money::from_whole_rupees(18));
    assert_eq!(saved.sgst, Money::from_whole_rupees(18));
    assert_eq!(saved.total_amount, Money::from_whole_rupees(236));
    drop(db);

    let reopened = Database::open(DbConfig::file(&path)).await.unwrap();
    let invoices = reopened.invoices().list();
    assert_eq!(invoices.len(), 1);

    let invoice = &invoices[0];
    assert_eq!(invoice.invoice_no, "INV0001");
    assert_eq!(invoice.company_name, "Acme");
    assert_eq!(invoice.total_amount, Money::from_whole_rupees(236));

    let lines = invoice.line_items().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].item_id, Some(item.id));
    assert_eq!(lines[0].amount, Money::from_whole_rupees(200));

    assert_eq!(
        reopened.invoices().generate_number().await.unwrap(),
        "INV0002"
    );
}

#[tokio::test]
async fn every_commit_round_trips_through_the_blob() {
    let db = Database::open(DbConfig::in_memory()).await.unwrap();

    let client = db.clients().add(acme()).await.unwrap();
    let item = db.items().add(widget()).await.unwrap();
    db.clients()
        .update(
            client.id,
            ClientInput {
                name: "Acme Ltd".to_string(),
                ..acme()
            },
        )
        .await
        .unwrap();
    db.items().delete(item.id).await.unwrap();

    let settings = db.settings().current();
    let mut draft = InvoiceDraft::new("INV0001", "2024-03-05", &settings);
    draft.set_client(&db.clients().get(client.id).unwrap());
    draft.add_item(&item);
    db.invoices().save(draft.build().unwrap()).await.unwrap();

    // A fresh engine over the persisted bytes sees exactly the snapshot
    let blob = db.export_blob().await;
    let copy = Database::open(DbConfig::with_store(Arc::new(BlobOnce(blob))))
        .await
        .unwrap();
    assert_eq!(*copy.snapshot(), *db.snapshot());
}

#[tokio::test]
async fn numbering_is_monotonic_and_prefix_isolated() {
    let db = Database::open(DbConfig::in_memory()).await.unwrap();
    let client = db.clients().add(acme()).await.unwrap();
    let item = db.items().add(widget()).await.unwrap();

    for expected in 1..=12 {
        let number = db.invoices().generate_number().await.unwrap();
        assert_eq!(number, format!("INV{:04}", expected));

        let mut draft = InvoiceDraft::new(number, "2024-04-01", &db.settings().current());
        draft.set_client(&client);
        draft.add_item(&item);
        db.invoices().save(draft.build().unwrap()).await.unwrap();
    }

    db.settings()
        .update(SettingsPatch {
            invoice_prefix: Some("BILL".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(db.invoices().generate_number().await.unwrap(), "BILL0001");

    db.settings()
        .update(SettingsPatch {
            invoice_prefix: Some("INV".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(db.invoices().generate_number().await.unwrap(), "INV0013");
}

#[tokio::test]
async fn stale_number_is_rejected_then_regenerated() {
    let db = Database::open(DbConfig::in_memory()).await.unwrap();
    let client = db.clients().add(acme()).await.unwrap();
    let item = db.items().add(widget()).await.unwrap();
    let settings = db.settings().current();

    // Two forms opened before either was saved
    let number = db.invoices().generate_number().await.unwrap();
    let build = |no: String| {
        let mut draft = InvoiceDraft::new(no, "2024-05-01", &settings);
        draft.set_client(&client);
        draft.add_item(&item);
        draft.build().unwrap()
    };

    db.invoices().save(build(number.clone())).await.unwrap();
    let err = db.invoices().save(build(number)).await.unwrap_err();
    assert!(matches!(err, DbError::UniqueViolation { .. }));

    let retry = db.invoices().generate_number().await.unwrap();
    let saved = db.invoices().save(build(retry)).await.unwrap();
    assert_eq!(saved.invoice_no, "INV0002");
}

#[tokio::test]
async fn local_storage_layout_and_settings_persist() {
    let kv = Arc::new(MemoryKeyValue::new());

    let db = Database::open(DbConfig::local_storage(kv.clone(), "swiftbill"))
        .await
        .unwrap();
    let before = db.settings().current();
    db.settings()
        .update(SettingsPatch {
            invoice_prefix: Some("BILL".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    drop(db);

    // Stored as a JSON array of bytes that opens as SQLite
    let raw = kv.get_item("swiftbill").unwrap();
    let bytes: Vec<u8> = serde_json::from_str(&raw).unwrap();
    assert!(Engine::open(Some(&bytes)).is_ok());

    let reopened = Database::open(DbConfig::local_storage(kv, "swiftbill"))
        .await
        .unwrap();
    let after = reopened.settings().load().await.unwrap();
    assert_eq!(after.invoice_prefix, "BILL");
    assert_eq!(after.company_name, before.company_name);
    assert_eq!(after.invoice_padding, before.invoice_padding);
}

#[tokio::test]
async fn quota_failure_keeps_memory_in_step_with_storage() {
    let db = Database::open(DbConfig::in_memory()).await.unwrap();
    db.clients().add(acme()).await.unwrap();
    let committed = db.export_blob().await;

    // Re-home the same data in a store that cannot grow
    let tight = Arc::new(MemoryKeyValue::with_quota(
        serde_json::to_string(&committed).unwrap().len(),
    ));
    tight
        .set_item("swiftbill", serde_json::to_string(&committed).unwrap())
        .unwrap();
    let db = Database::open(DbConfig::local_storage(tight.clone(), "swiftbill"))
        .await
        .unwrap();

    // Keep adding until the image outgrows the quota; it must within 100 rows
    let mut failure = None;
    for n in 0..100 {
        let before = tight.get_item("swiftbill").unwrap();
        let count = db.clients().list().len();

        let result = db
            .clients()
            .add(ClientInput {
                name: format!("Overflow {}", n),
                address: "x".repeat(500),
                ..Default::default()
            })
            .await;

        if let Err(e) = result {
            failure = Some((e, before, count));
            break;
        }
    }

    let (err, before, count) = failure.expect("quota was never hit");
    assert!(matches!(err, DbError::Storage(_)));
    assert_eq!(db.clients().list().len(), count);
    assert_eq!(tight.get_item("swiftbill").unwrap(), before);

    // The rolled-back engine still matches what storage holds
    let stored: Vec<u8> = serde_json::from_str(&before).unwrap();
    let reopened = Database::open(DbConfig::with_store(Arc::new(BlobOnce(stored))))
        .await
        .unwrap();
    assert_eq!(*reopened.snapshot(), *db.snapshot());
}

#[tokio::test]
async fn delete_client_leaves_invoice_with_blank_lookup() {
    let db = Database::open(DbConfig::in_memory()).await.unwrap();
    let client = db.clients().add(acme()).await.unwrap();
    let item = db.items().add(widget()).await.unwrap();

    let mut draft = InvoiceDraft::new("INV0001", "2024-03-05", &db.settings().current());
    draft.set_client(&client);
    draft.add_item(&item);
    let invoice = db.invoices().save(draft.build().unwrap()).await.unwrap();

    db.clients().delete(client.id).await.unwrap();
    db.clients().delete(client.id).await.unwrap();

    let snapshot = db.snapshot();
    let kept = snapshot.invoice(invoice.id.unwrap()).unwrap();
    assert_eq!(kept.company_name, "Acme");
    assert_eq!(snapshot.client_name(kept.client_id), "");
    assert_eq!(snapshot.metrics.total_clients, 0);
    assert_eq!(snapshot.metrics.total_invoices, 1);
}

/// Read-only store holding one blob; saves are accepted and dropped.
struct BlobOnce(Vec<u8>);

#[async_trait::async_trait]
impl swiftbill_db::BlobStore for BlobOnce {
    async fn load(&self) -> swiftbill_db::StoreResult<Vec<u8>> {
        Ok(self.0.clone())
    }

    async fn save(&self, _blob: &[u8]) -> swiftbill_db::StoreResult<()> {
        Ok(())
    }

    fn describe(&self) -> String {
        "blob-once".to_string()
    }
}
