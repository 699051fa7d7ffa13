use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use smartstore_core::{
    Action, AisleId, BasketId, DeviceId, Entity, EntityKind, InventoryId, StoreError, StoreId,
    StoreResult,
};
use smartstore_devices::Device;
use smartstore_inventory::Inventory;

use crate::aisle::{Aisle, CreateAisle};

/// Command: CreateStore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateStore {
    pub store_id: StoreId,
    pub address: String,
    pub description: String,
}

#[derive(Debug)]
struct StoreDetails {
    address: String,
    description: String,
}

/// A physical store.
///
/// Aisles are owned here. Inventory, devices and basket ids are per-store
/// indexes over entities the engine also registers globally.
#[derive(Debug)]
pub struct Store {
    id: StoreId,
    details: RwLock<StoreDetails>,
    aisles: RwLock<HashMap<AisleId, Arc<Aisle>>>,
    inventory: RwLock<HashMap<InventoryId, Arc<Inventory>>>,
    devices: RwLock<HashMap<DeviceId, Arc<Device>>>,
    baskets: RwLock<BTreeSet<BasketId>>,
}

impl Store {
    pub fn create(cmd: CreateStore) -> Self {
        Self {
            id: cmd.store_id,
            details: RwLock::new(StoreDetails {
                address: cmd.address,
                description: cmd.description,
            }),
            aisles: RwLock::new(HashMap::new()),
            inventory: RwLock::new(HashMap::new()),
            devices: RwLock::new(HashMap::new()),
            baskets: RwLock::new(BTreeSet::new()),
        }
    }

    pub fn address(&self) -> String {
        self.details.read().address.clone()
    }

    pub fn description(&self) -> String {
        self.details.read().description.clone()
    }

    /// Replace whichever details are given.
    pub fn update(&self, description: Option<String>, address: Option<String>) {
        let mut details = self.details.write();
        if let Some(description) = description {
            details.description = description;
        }
        if let Some(address) = address {
            details.address = address;
        }
    }

    pub fn add_aisle(&self, cmd: CreateAisle) -> StoreResult<Arc<Aisle>> {
        let mut aisles = self.aisles.write();
        if aisles.contains_key(&cmd.aisle_id) {
            return Err(StoreError::duplicate(Action::AddAisle, EntityKind::Aisle));
        }
        let aisle = Arc::new(Aisle::create(cmd));
        aisles.insert(aisle.id().clone(), aisle.clone());
        Ok(aisle)
    }

    pub fn get_aisle(&self, id: &AisleId) -> StoreResult<Arc<Aisle>> {
        self.aisles
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(Action::GetAisle, EntityKind::Aisle))
    }

    pub fn aisles(&self) -> Vec<Arc<Aisle>> {
        self.aisles.read().values().cloned().collect()
    }

    /// Index a slot already placed on one of this store's shelves.
    pub fn index_inventory(&self, slot: Arc<Inventory>) {
        self.inventory.write().insert(slot.id().clone(), slot);
    }

    pub fn inventory(&self, id: &InventoryId) -> Option<Arc<Inventory>> {
        self.inventory.read().get(id).cloned()
    }

    pub fn add_device(&self, device: Arc<Device>) -> StoreResult<()> {
        let mut devices = self.devices.write();
        if devices.contains_key(device.id()) {
            return Err(StoreError::duplicate(Action::AddDevice, EntityKind::Device));
        }
        devices.insert(device.id().clone(), device);
        Ok(())
    }

    pub fn device(&self, id: &DeviceId) -> Option<Arc<Device>> {
        self.devices.read().get(id).cloned()
    }

    pub fn add_basket(&self, id: BasketId) {
        self.baskets.write().insert(id);
    }

    /// Returns whether the basket was indexed here.
    pub fn remove_basket(&self, id: &BasketId) -> bool {
        self.baskets.write().remove(id)
    }

    pub fn has_basket(&self, id: &BasketId) -> bool {
        self.baskets.read().contains(id)
    }

    pub fn view(&self) -> StoreView {
        let details = self.details.read();
        let mut aisles: Vec<AisleId> = self.aisles.read().keys().cloned().collect();
        aisles.sort();
        let mut inventory: Vec<InventoryId> = self.inventory.read().keys().cloned().collect();
        inventory.sort();
        let mut devices: Vec<DeviceId> = self.devices.read().keys().cloned().collect();
        devices.sort();

        StoreView {
            id: self.id.clone(),
            address: details.address.clone(),
            description: details.description.clone(),
            aisles,
            inventory,
            devices,
            baskets: self.baskets.read().iter().cloned().collect(),
        }
    }
}

impl Entity for Store {
    type Id = StoreId;
    const KIND: EntityKind = EntityKind::Store;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Serializable projection of a store. Children are listed by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreView {
    pub id: StoreId,
    pub address: String,
    pub description: String,
    pub aisles: Vec<AisleId>,
    pub inventory: Vec<InventoryId>,
    pub devices: Vec<DeviceId>,
    pub baskets: Vec<BasketId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aisle::AisleLocation;
    use smartstore_core::{ErrorKind, Reason, StoreLocation};
    use smartstore_devices::CreateDevice;

    fn store() -> Store {
        Store::create(CreateStore {
            store_id: StoreId::new("store_123"),
            address: "75 Forest Street".to_string(),
            description: "corner store".to_string(),
        })
    }

    fn aisle(id: &str) -> CreateAisle {
        CreateAisle {
            aisle_id: AisleId::new(id),
            name: id.to_string(),
            description: String::new(),
            location: AisleLocation::Floor,
        }
    }

    #[test]
    fn aisles_are_unique_per_store() {
        let store = store();
        store.add_aisle(aisle("aisle_A1")).unwrap();
        let err = store.add_aisle(aisle("aisle_A1")).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::DuplicateEntity(EntityKind::Aisle));

        let err = store.get_aisle(&AisleId::new("aisle_B2")).unwrap_err();
        assert_eq!(err.reason(), Reason::NotFound);
        assert_eq!(err.action(), Action::GetAisle);
    }

    #[test]
    fn update_only_touches_given_fields() {
        let store = store();
        store.update(Some("flagship".to_string()), None);
        assert_eq!(store.description(), "flagship");
        assert_eq!(store.address(), "75 Forest Street");
    }

    #[test]
    fn view_lists_children_by_id() {
        let store = store();
        store.add_aisle(aisle("aisle_B")).unwrap();
        store.add_aisle(aisle("aisle_A")).unwrap();
        store.add_basket(BasketId::new("b1"));
        store
            .add_device(Arc::new(Device::create(CreateDevice {
                device_id: DeviceId::new("cam_1"),
                name: "door camera".to_string(),
                kind: "camera".parse().unwrap(),
                location: StoreLocation::new("store_123", "aisle_A"),
            })))
            .unwrap();

        let view = store.view();
        assert_eq!(view.aisles, vec![AisleId::new("aisle_A"), AisleId::new("aisle_B")]);
        assert_eq!(view.devices, vec![DeviceId::new("cam_1")]);
        assert_eq!(view.baskets, vec![BasketId::new("b1")]);

        assert!(store.remove_basket(&BasketId::new("b1")));
        assert!(!store.has_basket(&BasketId::new("b1")));
    }
}
