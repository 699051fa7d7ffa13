//! Write-behind persistence boundary.
//!
//! The in-memory graph is authoritative. After a mutation commits, the engine
//! hands the affected entity's projection to a [`PersistenceSink`]; what the
//! engine does when the sink fails is governed by [`SinkPolicy`].

pub mod in_memory;
pub mod json_lines;

use core::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use smartstore_baskets::BasketView;
use smartstore_core::{EntityKind, InventoryLocation, ParseError, StoreLocation};
use smartstore_customers::CustomerView;
use smartstore_devices::DeviceView;
use smartstore_inventory::InventoryView;
use smartstore_products::ProductView;
use smartstore_stores::{AisleView, ShelfView, StoreView};

pub use in_memory::InMemorySink;
pub use json_lines::JsonLinesSink;

/// Snapshot of one entity, keyed by kind and id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "entity", rename_all = "lowercase")]
pub enum Record {
    Store(StoreView),
    Aisle {
        location: StoreLocation,
        aisle: AisleView,
    },
    Shelf {
        location: InventoryLocation,
        shelf: ShelfView,
    },
    Inventory(InventoryView),
    Product(ProductView),
    Customer(CustomerView),
    Basket(BasketView),
    Device(DeviceView),
}

impl Record {
    pub fn kind(&self) -> EntityKind {
        match self {
            Record::Store(_) => EntityKind::Store,
            Record::Aisle { .. } => EntityKind::Aisle,
            Record::Shelf { .. } => EntityKind::Shelf,
            Record::Inventory(_) => EntityKind::Inventory,
            Record::Product(_) => EntityKind::Product,
            Record::Customer(_) => EntityKind::Customer,
            Record::Basket(_) => EntityKind::Basket,
            Record::Device(_) => EntityKind::Device,
        }
    }

    /// Key unique within [`Record::kind`]. Aisles and shelves are keyed by
    /// their full location since their ids are only unique in the parent.
    pub fn key(&self) -> String {
        match self {
            Record::Store(view) => view.id.to_string(),
            Record::Aisle { location, .. } => location.to_string(),
            Record::Shelf { location, .. } => location.to_string(),
            Record::Inventory(view) => view.id.to_string(),
            Record::Product(view) => view.id.to_string(),
            Record::Customer(view) => view.id.to_string(),
            Record::Basket(view) => view.id.to_string(),
            Record::Device(view) => view.id.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("record serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("sink rejected write: {0}")]
    Rejected(String),
}

/// Keyed upsert/remove of entity records.
pub trait PersistenceSink: Send + Sync {
    fn upsert(&self, record: &Record) -> Result<(), SinkError>;
    fn remove(&self, kind: EntityKind, key: &str) -> Result<(), SinkError>;
}

impl<S> PersistenceSink for Arc<S>
where
    S: PersistenceSink + ?Sized,
{
    fn upsert(&self, record: &Record) -> Result<(), SinkError> {
        (**self).upsert(record)
    }

    fn remove(&self, kind: EntityKind, key: &str) -> Result<(), SinkError> {
        (**self).remove(kind, key)
    }
}

/// Sink that drops every write.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl PersistenceSink for NoopSink {
    fn upsert(&self, _record: &Record) -> Result<(), SinkError> {
        Ok(())
    }

    fn remove(&self, _kind: EntityKind, _key: &str) -> Result<(), SinkError> {
        Ok(())
    }
}

/// What a failed sink write does to the operation that triggered it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SinkPolicy {
    /// Report the failure as a `Persistence` error. The in-memory change stays.
    #[default]
    Strict,
    /// Log the failure and report success.
    BestEffort,
}

impl FromStr for SinkPolicy {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(SinkPolicy::Strict),
            "best-effort" | "best_effort" => Ok(SinkPolicy::BestEffort),
            _ => Err(ParseError::unknown("sink policy", s)),
        }
    }
}
