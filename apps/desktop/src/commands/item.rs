//! # Catalog Item Commands
//!
//! Prices cross the boundary twice: as a rupee number the price field
//! edits, and as integer paise for exact display math.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use swiftbill_core::{Item, ItemInput, Money};

use crate::error::ApiError;
use crate::state::DbState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDto {
    pub id: i64,
    pub description: String,
    pub hsn: String,
    pub unit_price: f64,
    pub unit_price_paise: i64,
}

impl From<Item> for ItemDto {
    fn from(i: Item) -> Self {
        ItemDto {
            id: i.id,
            description: i.description,
            hsn: i.hsn,
            unit_price: i.unit_price.to_rupees(),
            unit_price_paise: i.unit_price.paise(),
        }
    }
}

/// Item form contents; `unit_price` is in rupees.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPayload {
    pub description: String,
    #[serde(default)]
    pub hsn: String,
    pub unit_price: f64,
}

impl From<ItemPayload> for ItemInput {
    fn from(p: ItemPayload) -> Self {
        ItemInput {
            description: p.description,
            hsn: p.hsn,
            unit_price: Money::from_rupees(p.unit_price),
        }
    }
}

/// All catalog items, ordered by description.
pub async fn list_items(state: &DbState) -> Result<Vec<ItemDto>, ApiError> {
    let items = state.inner().items().list();
    debug!(count = items.len(), "list_items command");
    Ok(items.into_iter().map(ItemDto::from).collect())
}

pub async fn add_item(state: &DbState, payload: ItemPayload) -> Result<ItemDto, ApiError> {
    let item = state.inner().items().add(payload.into()).await?;
    info!(id = item.id, description = %item.description, "Item added");
    Ok(item.into())
}

pub async fn update_item(
    state: &DbState,
    id: i64,
    payload: ItemPayload,
) -> Result<ItemDto, ApiError> {
    Ok(state.inner().items().update(id, payload.into()).await?.into())
}

/// Deletes a catalog item. Saved invoices keep their copied lines.
pub async fn delete_item(state: &DbState, id: i64) -> Result<bool, ApiError> {
    Ok(state.inner().items().delete(id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::{bootstrap, AppConfig};

    fn widget(price: f64) -> ItemPayload {
        ItemPayload {
            description: "Widget".to_string(),
            hsn: "1234".to_string(),
            unit_price: price,
        }
    }

    #[tokio::test]
    async fn test_item_prices_round_to_paise() {
        let state = bootstrap(&AppConfig::memory()).await.unwrap();

        let item = add_item(&state, widget(10.999)).await.unwrap();
        assert_eq!(item.unit_price_paise, 1100);
        assert_eq!(item.unit_price, 11.0);

        let updated = update_item(&state, item.id, widget(99.5)).await.unwrap();
        assert_eq!(updated.unit_price_paise, 9950);
        assert_eq!(list_items(&state).await.unwrap(), vec![updated]);
    }

    #[tokio::test]
    async fn test_update_missing_item() {
        let state = bootstrap(&AppConfig::memory()).await.unwrap();
        let err = update_item(&state, 77, widget(1.0)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(!delete_item(&state, 77).await.unwrap());
    }
}
