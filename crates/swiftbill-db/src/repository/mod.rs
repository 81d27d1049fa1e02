//! # Repository Module
//!
//! Data access for SwiftBill, one repository per table.
//!
//! ## Mutation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Every write goes the same way                        │
//! │                                                                         │
//! │  db.clients().add(input)                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate (swiftbill-core)  ──► Err(Validation), engine untouched     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::mutate(&[Collection::Clients], |engine| INSERT ...)         │
//! │       │                                                                 │
//! │       ├── execute (bound parameters)                                   │
//! │       ├── export blob                                                  │
//! │       ├── store.save(blob).await                                       │
//! │       └── reload the affected snapshot collections                     │
//! │                                                                         │
//! │  Reads (list/get) come from the snapshot and never lock the engine.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each module also owns the row mapper for its table, naming every
//! column it reads.
//!
//! ## Available Repositories
//!
//! - [`ClientRepository`](client::ClientRepository) - Client CRUD
//! - [`ItemRepository`](item::ItemRepository) - Catalog item CRUD
//! - [`InvoiceRepository`](invoice::InvoiceRepository) - Invoices, numbering, statements
//! - [`SettingsRepository`](settings::SettingsRepository) - The settings row
//! - [`MetricsRepository`](metrics::MetricsRepository) - Dashboard aggregates

pub mod client;
pub mod invoice;
pub mod item;
pub mod metrics;
pub mod settings;
