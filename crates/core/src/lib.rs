//! `smartstore-core`: shared building blocks for the store model.
//!
//! This crate contains **pure domain** primitives (no locking, no IO): typed
//! identifiers, location coordinates and the single failure type every store
//! operation returns.

pub mod entity;
pub mod error;
pub mod id;
pub mod location;
pub mod value_object;

pub use entity::Entity;
pub use error::{Action, EntityKind, ErrorKind, ParseError, Reason, StoreError, StoreResult};
pub use id::{AisleId, BasketId, CustomerId, DeviceId, InventoryId, ProductId, ShelfId, StoreId};
pub use location::{InventoryLocation, StoreLocation};
pub use value_object::ValueObject;
