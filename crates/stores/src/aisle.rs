use core::str::FromStr;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use smartstore_core::{
    Action, AisleId, Entity, EntityKind, ErrorKind, ParseError, ProductId, ShelfId, StoreError,
    StoreResult,
};
use smartstore_inventory::Inventory;

use crate::shelf::{CreateShelf, Shelf};

/// Where an aisle sits: on the sales floor or in the back room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AisleLocation {
    Floor,
    StoreRoom,
}

impl AisleLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            AisleLocation::Floor => "floor",
            AisleLocation::StoreRoom => "store_room",
        }
    }
}

impl core::fmt::Display for AisleLocation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AisleLocation {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "floor" => Ok(AisleLocation::Floor),
            "store_room" => Ok(AisleLocation::StoreRoom),
            _ => Err(ParseError::unknown("aisle location", s)),
        }
    }
}

/// Command: CreateAisle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAisle {
    pub aisle_id: AisleId,
    pub name: String,
    pub description: String,
    pub location: AisleLocation,
}

#[derive(Debug)]
pub struct Aisle {
    id: AisleId,
    name: String,
    description: String,
    location: AisleLocation,
    shelves: RwLock<HashMap<ShelfId, Arc<Shelf>>>,
}

impl Aisle {
    pub fn create(cmd: CreateAisle) -> Self {
        Self {
            id: cmd.aisle_id,
            name: cmd.name,
            description: cmd.description,
            location: cmd.location,
            shelves: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn location(&self) -> AisleLocation {
        self.location
    }

    /// Add a shelf. Each level holds at most one shelf, whatever its id.
    pub fn add_shelf(&self, cmd: CreateShelf) -> StoreResult<Arc<Shelf>> {
        let mut shelves = self.shelves.write();
        if shelves.values().any(|shelf| shelf.level() == cmd.level) {
            return Err(StoreError::new(Action::AddShelf, ErrorKind::ShelfLevelOccupied));
        }
        if shelves.contains_key(&cmd.shelf_id) {
            return Err(StoreError::duplicate(Action::AddShelf, EntityKind::Shelf));
        }

        let shelf = Arc::new(Shelf::create(cmd));
        shelves.insert(shelf.id().clone(), shelf.clone());
        Ok(shelf)
    }

    pub fn get_shelf(&self, id: &ShelfId) -> StoreResult<Arc<Shelf>> {
        self.shelves
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(Action::GetShelf, EntityKind::Shelf))
    }

    pub fn shelves(&self) -> Vec<Arc<Shelf>> {
        self.shelves.read().values().cloned().collect()
    }

    /// Every slot in this aisle stocking `product_id`.
    pub fn find_product(&self, product_id: &ProductId) -> Vec<Arc<Inventory>> {
        self.shelves
            .read()
            .values()
            .flat_map(|shelf| shelf.inventory_for_product(product_id))
            .collect()
    }

    /// The single slot a customer standing in this aisle can reach for
    /// `product_id`.
    pub fn locate_product(&self, product_id: &ProductId, action: Action) -> StoreResult<Arc<Inventory>> {
        let mut found = self.find_product(product_id);
        match found.len() {
            0 => Err(StoreError::new(action, ErrorKind::ProductNotNearCustomer)),
            1 => Ok(found.remove(0)),
            n => Err(StoreError::new(action, ErrorKind::AmbiguousProduct(n))),
        }
    }

    pub fn view(&self) -> AisleView {
        let mut shelves: Vec<ShelfId> = self.shelves.read().keys().cloned().collect();
        shelves.sort();
        AisleView {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            location: self.location,
            shelves,
        }
    }
}

impl Entity for Aisle {
    type Id = AisleId;
    const KIND: EntityKind = EntityKind::Aisle;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Serializable projection of an aisle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AisleView {
    pub id: AisleId,
    pub name: String,
    pub description: String,
    pub location: AisleLocation,
    pub shelves: Vec<ShelfId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shelf::ShelfLevel;
    use smartstore_core::{InventoryId, InventoryLocation, Reason};
    use smartstore_inventory::{CreateInventory, InventoryType};
    use smartstore_products::Temperature;

    fn aisle() -> Aisle {
        Aisle::create(CreateAisle {
            aisle_id: AisleId::new("aisle_A1"),
            name: "dairy".to_string(),
            description: "cold goods".to_string(),
            location: AisleLocation::Floor,
        })
    }

    fn shelf(id: &str, level: ShelfLevel) -> CreateShelf {
        CreateShelf {
            shelf_id: ShelfId::new(id),
            name: id.to_string(),
            level,
            description: String::new(),
            temperature: Temperature::Ambient,
        }
    }

    fn stock(shelf: &Shelf, inventory_id: &str, product: &str) {
        shelf
            .add_inventory(&CreateInventory {
                inventory_id: InventoryId::new(inventory_id),
                location: InventoryLocation::new("store_123", "aisle_A1", shelf.id().as_str()),
                capacity: 10,
                count: 5,
                product_id: ProductId::new(product),
                kind: InventoryType::Standard,
            })
            .unwrap();
    }

    #[test]
    fn level_is_checked_before_shelf_id() {
        let aisle = aisle();
        aisle.add_shelf(shelf("shelf_1", ShelfLevel::Low)).unwrap();

        let err = aisle.add_shelf(shelf("shelf_1", ShelfLevel::Low)).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ShelfLevelOccupied);

        let err = aisle.add_shelf(shelf("shelf_1", ShelfLevel::High)).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::DuplicateEntity(EntityKind::Shelf));
    }

    #[test]
    fn get_shelf_never_creates() {
        let err = aisle().get_shelf(&ShelfId::new("nope")).unwrap_err();
        assert_eq!(err.reason(), Reason::NotFound);
        assert_eq!(err.action(), Action::GetShelf);
    }

    #[test]
    fn locate_product_requires_exactly_one_slot() {
        let aisle = aisle();
        let low = aisle.add_shelf(shelf("shelf_low", ShelfLevel::Low)).unwrap();
        let high = aisle.add_shelf(shelf("shelf_high", ShelfLevel::High)).unwrap();
        stock(&low, "inv_1", "prod10");
        stock(&low, "inv_2", "prod11");
        stock(&high, "inv_3", "prod11");

        let slot = aisle.locate_product(&ProductId::new("prod10"), Action::AddProduct).unwrap();
        assert_eq!(slot.id().as_str(), "inv_1");

        let err = aisle
            .locate_product(&ProductId::new("prod11"), Action::AddProduct)
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::AmbiguousProduct(2));

        let err = aisle
            .locate_product(&ProductId::new("prod12"), Action::RemoveProduct)
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ProductNotNearCustomer);
        assert_eq!(err.action(), Action::RemoveProduct);
    }

    #[test]
    fn store_room_round_trips_through_text() {
        let location: AisleLocation = "store_room".parse().unwrap();
        assert_eq!(location, AisleLocation::StoreRoom);
        assert_eq!(location.to_string(), "store_room");
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn level() -> impl Strategy<Value = ShelfLevel> {
            prop_oneof![
                Just(ShelfLevel::High),
                Just(ShelfLevel::Medium),
                Just(ShelfLevel::Low),
            ]
        }

        proptest! {
            /// Property: a second shelf at an occupied level always fails, whatever its id.
            #[test]
            fn occupied_level_always_rejects(level in level(), first in "[a-z]{1,8}", second in "[a-z]{1,8}") {
                let aisle = aisle();
                aisle.add_shelf(shelf(&first, level)).unwrap();

                let err = aisle.add_shelf(shelf(&second, level)).unwrap_err();
                prop_assert_eq!(err.kind(), &ErrorKind::ShelfLevelOccupied);
                prop_assert_eq!(aisle.shelves().len(), 1);
            }
        }
    }
}
