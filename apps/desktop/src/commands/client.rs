//! # Client Commands

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use swiftbill_core::{Client, ClientInput};

use crate::error::ApiError;
use crate::state::DbState;

/// Client as shown in the clients table and the invoice client picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientDto {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub gstin: String,
}

impl From<Client> for ClientDto {
    fn from(c: Client) -> Self {
        ClientDto {
            id: c.id,
            name: c.name,
            address: c.address,
            gstin: c.gstin,
        }
    }
}

/// All clients, ordered by name.
pub async fn list_clients(state: &DbState) -> Result<Vec<ClientDto>, ApiError> {
    let clients = state.inner().clients().list();
    debug!(count = clients.len(), "list_clients command");
    Ok(clients.into_iter().map(ClientDto::from).collect())
}

pub async fn get_client(state: &DbState, id: i64) -> Result<ClientDto, ApiError> {
    state
        .inner()
        .clients()
        .get(id)
        .map(ClientDto::from)
        .ok_or_else(|| ApiError::not_found("Client", id))
}

pub async fn add_client(state: &DbState, input: ClientInput) -> Result<ClientDto, ApiError> {
    let client = state.inner().clients().add(input).await?;
    info!(id = client.id, name = %client.name, "Client added");
    Ok(client.into())
}

pub async fn update_client(
    state: &DbState,
    id: i64,
    input: ClientInput,
) -> Result<ClientDto, ApiError> {
    let client = state.inner().clients().update(id, input).await?;
    Ok(client.into())
}

/// Deletes a client. Invoices billed to it keep their stored company name.
///
/// ## Returns
/// `false` when the client was already gone.
pub async fn delete_client(state: &DbState, id: i64) -> Result<bool, ApiError> {
    Ok(state.inner().clients().delete(id).await?)
}
