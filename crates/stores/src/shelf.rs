use core::str::FromStr;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use smartstore_core::{
    Action, Entity, EntityKind, InventoryId, ParseError, ProductId, ShelfId, StoreError,
    StoreResult,
};
use smartstore_inventory::{CreateInventory, Inventory};
use smartstore_products::Temperature;

/// Vertical position of a shelf within its aisle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShelfLevel {
    High,
    Medium,
    Low,
}

impl ShelfLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShelfLevel::High => "high",
            ShelfLevel::Medium => "medium",
            ShelfLevel::Low => "low",
        }
    }
}

impl core::fmt::Display for ShelfLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShelfLevel {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(ShelfLevel::High),
            "medium" => Ok(ShelfLevel::Medium),
            "low" => Ok(ShelfLevel::Low),
            _ => Err(ParseError::unknown("shelf level", s)),
        }
    }
}

/// Command: CreateShelf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateShelf {
    pub shelf_id: ShelfId,
    pub name: String,
    pub level: ShelfLevel,
    pub description: String,
    pub temperature: Temperature,
}

/// A shelf holding inventory slots, all kept at one temperature.
#[derive(Debug)]
pub struct Shelf {
    id: ShelfId,
    name: String,
    level: ShelfLevel,
    description: String,
    temperature: Temperature,
    inventory: RwLock<HashMap<InventoryId, Arc<Inventory>>>,
}

impl Shelf {
    pub fn create(cmd: CreateShelf) -> Self {
        Self {
            id: cmd.shelf_id,
            name: cmd.name,
            level: cmd.level,
            description: cmd.description,
            temperature: cmd.temperature,
            inventory: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> ShelfLevel {
        self.level
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn temperature(&self) -> Temperature {
        self.temperature
    }

    /// Place a new slot on this shelf.
    ///
    /// Bounds are checked before the id, so an out-of-range count is reported
    /// even when the id is also taken.
    pub fn add_inventory(&self, cmd: &CreateInventory) -> StoreResult<Arc<Inventory>> {
        let slot = Inventory::create(cmd)?;
        match self.inventory.write().entry(cmd.inventory_id.clone()) {
            Entry::Occupied(_) => Err(StoreError::duplicate(
                Action::AddInventory,
                EntityKind::Inventory,
            )),
            Entry::Vacant(entry) => Ok(entry.insert(Arc::new(slot)).clone()),
        }
    }

    pub fn inventory(&self, id: &InventoryId) -> Option<Arc<Inventory>> {
        self.inventory.read().get(id).cloned()
    }

    pub fn inventories(&self) -> Vec<Arc<Inventory>> {
        self.inventory.read().values().cloned().collect()
    }

    /// Slots on this shelf stocking `product_id`.
    pub fn inventory_for_product(&self, product_id: &ProductId) -> Vec<Arc<Inventory>> {
        self.inventory
            .read()
            .values()
            .filter(|slot| slot.holds(product_id))
            .cloned()
            .collect()
    }

    pub fn view(&self) -> ShelfView {
        let mut inventory: Vec<InventoryId> = self.inventory.read().keys().cloned().collect();
        inventory.sort();
        ShelfView {
            id: self.id.clone(),
            name: self.name.clone(),
            level: self.level,
            description: self.description.clone(),
            temperature: self.temperature,
            inventory,
        }
    }
}

impl Entity for Shelf {
    type Id = ShelfId;
    const KIND: EntityKind = EntityKind::Shelf;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Serializable projection of a shelf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShelfView {
    pub id: ShelfId,
    pub name: String,
    pub level: ShelfLevel,
    pub description: String,
    pub temperature: Temperature,
    pub inventory: Vec<InventoryId>,
}
