//! # Client Repository
//!
//! Database operations for clients.
//!
//! Deleting a client does not touch its invoices. They keep the
//! `company_name` snapshot and their `client_id` simply stops resolving
//! (see [`Snapshot::client_name`](crate::snapshot::Snapshot::client_name)).

use rusqlite::{params, Row};
use tracing::{debug, warn};

use swiftbill_core::validation::validate_client;
use swiftbill_core::{Client, ClientInput};

use crate::database::Database;
use crate::engine::Engine;
use crate::error::{DbError, DbResult};
use crate::snapshot::Collection;

/// Repository for client database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.clients();
///
/// let acme = repo.add(ClientInput { name: "Acme".into(), ..Default::default() }).await?;
/// repo.delete(acme.id).await?;
/// repo.delete(acme.id).await?; // already gone, still Ok
/// ```
#[derive(Debug, Clone)]
pub struct ClientRepository {
    db: Database,
}

impl ClientRepository {
    /// Creates a new ClientRepository.
    pub fn new(db: Database) -> Self {
        ClientRepository { db }
    }

    /// All clients, ordered by name.
    pub fn list(&self) -> Vec<Client> {
        self.db.snapshot().clients.clone()
    }

    /// Gets a client by id.
    pub fn get(&self, id: i64) -> Option<Client> {
        self.db.snapshot().client(id).cloned()
    }

    /// Inserts a new client.
    ///
    /// ## Returns
    /// * `Ok(Client)` - The stored client with its assigned id
    /// * `Err(DbError::Validation)` - Name missing or a field too long
    pub async fn add(&self, input: ClientInput) -> DbResult<Client> {
        validate_client(&input)?;
        debug!(name = %input.name, "Adding client");

        self.db
            .mutate(&[Collection::Clients], move |engine| {
                engine.execute(
                    "INSERT INTO clients (name, address, gstin) VALUES (?1, ?2, ?3)",
                    params![input.name, input.address, input.gstin],
                )?;
                Ok(Client {
                    id: engine.last_insert_rowid(),
                    name: input.name,
                    address: input.address,
                    gstin: input.gstin,
                })
            })
            .await
    }

    /// Replaces every field of an existing client.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No client has this id
    pub async fn update(&self, id: i64, input: ClientInput) -> DbResult<Client> {
        validate_client(&input)?;
        debug!(id = %id, name = %input.name, "Updating client");

        self.db
            .mutate(&[Collection::Clients], move |engine| {
                let changed = engine.execute(
                    "UPDATE clients SET name = ?2, address = ?3, gstin = ?4 WHERE id = ?1",
                    params![id, input.name, input.address, input.gstin],
                )?;
                if changed == 0 {
                    warn!(id = %id, "Update of unknown client");
                    return Err(DbError::not_found("Client", id));
                }
                Ok(Client {
                    id,
                    name: input.name,
                    address: input.address,
                    gstin: input.gstin,
                })
            })
            .await
    }

    /// Deletes a client.
    ///
    /// ## Returns
    /// * `Ok(true)` - The row was removed
    /// * `Ok(false)` - No such client; nothing to do
    pub async fn delete(&self, id: i64) -> DbResult<bool> {
        debug!(id = %id, "Deleting client");

        self.db
            .mutate(&[Collection::Clients], move |engine| {
                Ok(engine.execute("DELETE FROM clients WHERE id = ?1", [id])? > 0)
            })
            .await
    }
}

/// Reads every client, ordered by name.
pub(crate) fn load_all(engine: &Engine) -> DbResult<Vec<Client>> {
    engine.query(
        "SELECT id, name, address, gstin FROM clients ORDER BY name COLLATE NOCASE, id",
        [],
        map_client,
    )
}

fn map_client(row: &Row<'_>) -> rusqlite::Result<Client> {
    Ok(Client {
        id: row.get("id")?,
        name: row.get("name")?,
        address: row.get::<_, Option<String>>("address")?.unwrap_or_default(),
        gstin: row.get::<_, Option<String>>("gstin")?.unwrap_or_default(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, DbError};
    use swiftbill_core::{ClientInput, Invoice, Money, ValidationError};

    fn input(name: &str) -> ClientInput {
        ClientInput {
            name: name.to_string(),
            address: "1 Main St".to_string(),
            gstin: "GST1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_assigns_id_and_lists_by_name() {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();
        let repo = db.clients();

        let zeta = repo.add(input("Zeta Corp")).await.unwrap();
        let acme = repo.add(input("acme")).await.unwrap();

        assert_ne!(zeta.id, acme.id);
        let names: Vec<String> = repo.list().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["acme", "Zeta Corp"]);
        assert_eq!(repo.get(acme.id), Some(acme));
    }

    #[tokio::test]
    async fn test_blank_name_rejected_before_engine() {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();

        let err = db.clients().add(input("   ")).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Validation(ValidationError::Required { .. })
        ));
        assert!(db.clients().list().is_empty());
    }

    #[tokio::test]
    async fn test_update_requires_existing_id() {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();
        let repo = db.clients();
        let acme = repo.add(input("Acme")).await.unwrap();

        let renamed = repo.update(acme.id, input("Acme Ltd")).await.unwrap();
        assert_eq!(repo.get(acme.id).unwrap().name, "Acme Ltd");
        assert_eq!(renamed.id, acme.id);

        let err = repo.update(999, input("Ghost")).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_an_error() {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();
        let repo = db.clients();
        let acme = repo.add(input("Acme")).await.unwrap();

        assert!(repo.delete(acme.id).await.unwrap());
        assert!(!repo.delete(acme.id).await.unwrap());
        assert!(repo.get(acme.id).is_none());
        assert_eq!(db.snapshot().metrics.total_clients, 0);
    }

    #[tokio::test]
    async fn test_delete_client_with_invoices_keeps_them() {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();
        let acme = db.clients().add(input("Acme")).await.unwrap();

        let invoice = Invoice {
            id: None,
            invoice_no: "INV0001".to_string(),
            bill_date: "2024-03-05".to_string(),
            client_id: Some(acme.id),
            company_name: "Acme".to_string(),
            base_amount: Money::from_whole_rupees(100),
            cgst: Money::zero(),
            sgst: Money::zero(),
            total_amount: Money::from_whole_rupees(100),
            items_json: "[]".to_string(),
            vehicle_number: None,
        };
        let saved = db.invoices().save(invoice.clone()).await.unwrap();

        assert!(db.clients().delete(acme.id).await.unwrap());
        let kept = db.invoices().get(saved.id.unwrap()).unwrap();
        assert_eq!(kept.client_id, Some(acme.id));
        assert_eq!(kept.company_name, "Acme");

        // A client id with no row is accepted too
        let orphan = Invoice {
            invoice_no: "INV0002".to_string(),
            client_id: Some(99),
            ..invoice
        };
        assert!(db.invoices().save(orphan).await.is_ok());
        assert_eq!(db.invoices().list().len(), 2);
    }

    #[tokio::test]
    async fn test_quotes_survive_binding() {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();
        let mut tricky = input("O'Reilly & Sons");
        tricky.address = "12 \"Old\" Rd; DROP TABLE clients;--".to_string();

        let stored = db.clients().add(tricky.clone()).await.unwrap();
        assert_eq!(db.clients().get(stored.id).unwrap().address, tricky.address);
    }
}
