//! # Snapshot Cache
//!
//! The loaded collections readers render from. A snapshot is immutable;
//! every committed mutation builds a new one and swaps the `Arc`, so a
//! reader holding the old one keeps a consistent view.

use swiftbill_core::{Client, Invoice, Item, Metrics, Settings};

use crate::engine::Engine;
use crate::error::DbResult;
use crate::repository::{client, invoice, item, metrics, settings};

/// A loaded collection that a mutation can invalidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Clients,
    Items,
    Invoices,
    Settings,
}

/// Everything the UI reads without touching the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Ordered by name.
    pub clients: Vec<Client>,
    /// Ordered by description.
    pub items: Vec<Item>,
    /// Newest bill date first.
    pub invoices: Vec<Invoice>,
    pub settings: Settings,
    pub metrics: Metrics,
}

impl Snapshot {
    /// Reads every collection from the engine.
    pub(crate) fn load(engine: &Engine) -> DbResult<Self> {
        Ok(Snapshot {
            clients: client::load_all(engine)?,
            items: item::load_all(engine)?,
            invoices: invoice::load_all(engine)?,
            settings: settings::read_settings(engine)?,
            metrics: metrics::compute(engine)?,
        })
    }

    /// Copy of `self` with the `affected` collections re-read.
    ///
    /// Metrics depend on clients and invoices and follow them.
    pub(crate) fn reload(&self, engine: &Engine, affected: &[Collection]) -> DbResult<Self> {
        let mut next = self.clone();
        let mut metrics_stale = false;

        for collection in affected {
            match collection {
                Collection::Clients => {
                    next.clients = client::load_all(engine)?;
                    metrics_stale = true;
                }
                Collection::Items => next.items = item::load_all(engine)?,
                Collection::Invoices => {
                    next.invoices = invoice::load_all(engine)?;
                    metrics_stale = true;
                }
                Collection::Settings => next.settings = settings::read_settings(engine)?,
            }
        }

        if metrics_stale {
            next.metrics = metrics::compute(engine)?;
        }

        Ok(next)
    }

    pub fn client(&self, id: i64) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    pub fn item(&self, id: i64) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn invoice(&self, id: i64) -> Option<&Invoice> {
        self.invoices.iter().find(|inv| inv.id == Some(id))
    }

    /// Name of the client an invoice points at, or `""` when the client
    /// has since been deleted.
    pub fn client_name(&self, id: Option<i64>) -> &str {
        id.and_then(|id| self.client(id))
            .map(|c| c.name.as_str())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_name_of_orphan_is_blank() {
        let snapshot = Snapshot {
            clients: vec![Client {
                id: 1,
                name: "Acme".to_string(),
                address: String::new(),
                gstin: String::new(),
            }],
            ..Default::default()
        };

        assert_eq!(snapshot.client_name(Some(1)), "Acme");
        assert_eq!(snapshot.client_name(Some(2)), "");
        assert_eq!(snapshot.client_name(None), "");
    }
}
