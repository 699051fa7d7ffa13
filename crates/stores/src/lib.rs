//! Physical store hierarchy: Store → Aisle → Shelf → Inventory.
//!
//! Containers own their children behind `parking_lot` locks and hand out
//! `Arc`s, so a caller can keep working with a shelf or slot without holding
//! the parent's map lock.

pub mod aisle;
pub mod shelf;
pub mod store;

pub use aisle::{Aisle, AisleLocation, AisleView, CreateAisle};
pub use shelf::{CreateShelf, Shelf, ShelfLevel, ShelfView};
pub use store::{CreateStore, Store, StoreView};
