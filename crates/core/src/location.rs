//! Location coordinates.
//!
//! Locations address entities by id instead of holding references, so a
//! customer or inventory slot can say where it is without keeping the store
//! graph alive. The textual form is colon separated: `store:aisle` and
//! `store:aisle:shelf`.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::id::{AisleId, ShelfId, StoreId};
use crate::value_object::ValueObject;

/// Position inside a store: which aisle of which store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreLocation {
    pub store_id: StoreId,
    pub aisle_id: AisleId,
}

impl StoreLocation {
    pub fn new(store_id: impl Into<StoreId>, aisle_id: impl Into<AisleId>) -> Self {
        Self {
            store_id: store_id.into(),
            aisle_id: aisle_id.into(),
        }
    }
}

impl ValueObject for StoreLocation {}

impl core::fmt::Display for StoreLocation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.store_id, self.aisle_id)
    }
}

impl FromStr for StoreLocation {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match split_parts::<2>(s) {
            Some([store, aisle]) => Ok(Self {
                store_id: store.parse()?,
                aisle_id: aisle.parse()?,
            }),
            None => Err(ParseError::MalformedLocation(s.to_string(), "store:aisle")),
        }
    }
}

/// Position of an inventory slot: store, aisle and shelf.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InventoryLocation {
    pub store_id: StoreId,
    pub aisle_id: AisleId,
    pub shelf_id: ShelfId,
}

impl InventoryLocation {
    pub fn new(
        store_id: impl Into<StoreId>,
        aisle_id: impl Into<AisleId>,
        shelf_id: impl Into<ShelfId>,
    ) -> Self {
        Self {
            store_id: store_id.into(),
            aisle_id: aisle_id.into(),
            shelf_id: shelf_id.into(),
        }
    }

    /// The aisle this slot is reachable from.
    pub fn store_location(&self) -> StoreLocation {
        StoreLocation {
            store_id: self.store_id.clone(),
            aisle_id: self.aisle_id.clone(),
        }
    }
}

impl ValueObject for InventoryLocation {}

impl core::fmt::Display for InventoryLocation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}:{}", self.store_id, self.aisle_id, self.shelf_id)
    }
}

impl FromStr for InventoryLocation {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match split_parts::<3>(s) {
            Some([store, aisle, shelf]) => Ok(Self {
                store_id: store.parse()?,
                aisle_id: aisle.parse()?,
                shelf_id: shelf.parse()?,
            }),
            None => Err(ParseError::MalformedLocation(
                s.to_string(),
                "store:aisle:shelf",
            )),
        }
    }
}

fn split_parts<const N: usize>(s: &str) -> Option<[&str; N]> {
    let parts: Vec<&str> = s.trim().split(':').collect();
    parts.try_into().ok()
}
