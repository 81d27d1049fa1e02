//! # Item Repository
//!
//! Catalog items used to pre-fill invoice lines. Invoices copy what they
//! need into `items_json`, so editing or deleting an item never changes a
//! saved invoice.

use rusqlite::{params, Row};
use tracing::{debug, warn};

use swiftbill_core::validation::validate_item;
use swiftbill_core::{Item, ItemInput, Money};

use crate::database::Database;
use crate::engine::Engine;
use crate::error::{DbError, DbResult};
use crate::snapshot::Collection;

/// Repository for catalog item operations.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    db: Database,
}

impl ItemRepository {
    pub fn new(db: Database) -> Self {
        ItemRepository { db }
    }

    /// All items, ordered by description.
    pub fn list(&self) -> Vec<Item> {
        self.db.snapshot().items.clone()
    }

    pub fn get(&self, id: i64) -> Option<Item> {
        self.db.snapshot().item(id).cloned()
    }

    /// Inserts a new catalog item.
    ///
    /// ## Returns
    /// * `Ok(Item)` - The stored item with its assigned id
    /// * `Err(DbError::Validation)` - Missing description or negative price
    pub async fn add(&self, input: ItemInput) -> DbResult<Item> {
        validate_item(&input)?;
        debug!(description = %input.description, price = %input.unit_price, "Adding item");

        self.db
            .mutate(&[Collection::Items], move |engine| {
                engine.execute(
                    "INSERT INTO items (description, hsn, unit_price) VALUES (?1, ?2, ?3)",
                    params![input.description, input.hsn, input.unit_price.to_rupees()],
                )?;
                Ok(Item {
                    id: engine.last_insert_rowid(),
                    description: input.description,
                    hsn: input.hsn,
                    unit_price: input.unit_price,
                })
            })
            .await
    }

    /// Replaces every field of an existing item.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No item has this id
    pub async fn update(&self, id: i64, input: ItemInput) -> DbResult<Item> {
        validate_item(&input)?;
        debug!(id = %id, "Updating item");

        self.db
            .mutate(&[Collection::Items], move |engine| {
                let changed = engine.execute(
                    "UPDATE items SET description = ?2, hsn = ?3, unit_price = ?4 WHERE id = ?1",
                    params![id, input.description, input.hsn, input.unit_price.to_rupees()],
                )?;
                if changed == 0 {
                    warn!(id = %id, "Update of unknown item");
                    return Err(DbError::not_found("Item", id));
                }
                Ok(Item {
                    id,
                    description: input.description,
                    hsn: input.hsn,
                    unit_price: input.unit_price,
                })
            })
            .await
    }

    /// Deletes an item. Returns `false` when it was already absent.
    pub async fn delete(&self, id: i64) -> DbResult<bool> {
        debug!(id = %id, "Deleting item");

        self.db
            .mutate(&[Collection::Items], move |engine| {
                Ok(engine.execute("DELETE FROM items WHERE id = ?1", [id])? > 0)
            })
            .await
    }
}

pub(crate) fn load_all(engine: &Engine) -> DbResult<Vec<Item>> {
    engine.query(
        "SELECT id, description, hsn, unit_price FROM items ORDER BY description COLLATE NOCASE, id",
        [],
        map_item,
    )
}

fn map_item(row: &Row<'_>) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get("id")?,
        description: row.get("description")?,
        hsn: row.get::<_, Option<String>>("hsn")?.unwrap_or_default(),
        unit_price: Money::from_rupees(row.get::<_, Option<f64>>("unit_price")?.unwrap_or(0.0)),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
