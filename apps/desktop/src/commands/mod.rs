//! # Desktop Commands
//!
//! Every operation the invoicing UI can invoke.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── client.rs    ◄─── list/add/update/delete clients
//! ├── item.rs      ◄─── list/add/update/delete catalog items
//! ├── invoice.rs   ◄─── invoices, next number, metrics, statements
//! ├── settings.rs  ◄─── get/update settings, backup
//! └── bridge.rs    ◄─── read/write/export raw database bytes
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UI                                                                     │
//! │  invoke('add_client', { input: { name: 'Acme', ... } })                 │
//! │         │                                                               │
//! │         │ (JSON over the window shell's IPC)                            │
//! │         ▼                                                               │
//! │  async fn add_client(state: &DbState, input: ClientInput)               │
//! │      -> Result<ClientDto, ApiError>                                     │
//! │         │                                                               │
//! │         │ validate → execute → export → persist → reload snapshot       │
//! │         ▼                                                               │
//! │  UI receives: ClientDto (camelCase JSON) or ApiError {code, message}    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reads come from the snapshot and never wait on storage. Mutations return
//! only after the new database image has been saved.

pub mod bridge;
pub mod client;
pub mod invoice;
pub mod item;
pub mod settings;
