//! Inventory module.
//!
//! An inventory slot is a stocked quantity of one product at one shelf
//! position. Its count is bounded by `0..=capacity` and only moves through
//! the bounded operations on [`Inventory`], each of which holds the slot's own
//! lock.

pub mod slot;

pub use slot::{CreateInventory, Inventory, InventoryType, InventoryView};
