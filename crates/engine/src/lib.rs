//! Store transaction engine.
//!
//! [`StoreService`] owns the global registries (stores, products, customers,
//! baskets, devices, inventory) and the customer→store membership map, and
//! sequences every operation that spans more than one entity. Successful
//! mutations are forwarded to a [`PersistenceSink`](sink::PersistenceSink)
//! after they commit in memory.

pub mod commands;
pub mod config;
pub mod registry;
pub mod service;
pub mod sink;


pub use commands::{ProvisionAisle, ProvisionDevice, ProvisionShelf, UpdateStore};
pub use config::{ConfigError, EngineConfig, SinkConfig};
pub use registry::Registry;
pub use service::StoreService;
pub use sink::{
    InMemorySink, JsonLinesSink, NoopSink, PersistenceSink, Record, SinkError, SinkPolicy,
};
