//! Engine-level provisioning commands.
//!
//! Entity crates define the `Create*` commands for a single object. The
//! commands here add the container coordinates the engine needs to find the
//! parent before delegating.

use serde::{Deserialize, Serialize};

use smartstore_core::{AisleId, DeviceId, InventoryLocation, ShelfId, StoreId, StoreLocation};
use smartstore_products::Temperature;
use smartstore_stores::{AisleLocation, CreateAisle, CreateShelf, ShelfLevel};

/// Command: add an aisle to a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionAisle {
    pub location: StoreLocation,
    pub name: String,
    pub description: String,
    pub aisle_location: AisleLocation,
}

impl ProvisionAisle {
    pub(crate) fn to_create(&self) -> CreateAisle {
        CreateAisle {
            aisle_id: self.location.aisle_id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            location: self.aisle_location,
        }
    }
}

/// Command: add a shelf to an aisle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionShelf {
    pub location: InventoryLocation,
    pub name: String,
    pub level: ShelfLevel,
    pub description: String,
    pub temperature: Temperature,
}

impl ProvisionShelf {
    pub(crate) fn to_create(&self) -> CreateShelf {
        CreateShelf {
            shelf_id: self.location.shelf_id.clone(),
            name: self.name.clone(),
            level: self.level,
            description: self.description.clone(),
            temperature: self.temperature,
        }
    }

    pub fn store_id(&self) -> &StoreId {
        &self.location.store_id
    }

    pub fn aisle_id(&self) -> &AisleId {
        &self.location.aisle_id
    }

    pub fn shelf_id(&self) -> &ShelfId {
        &self.location.shelf_id
    }
}

/// Command: install a device in an aisle.
///
/// `device_type` is resolved to a concrete kind when the command runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionDevice {
    pub device_id: DeviceId,
    pub name: String,
    pub device_type: String,
    pub location: StoreLocation,
}

/// Command: change a store's details. `None` leaves a field as is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStore {
    pub store_id: StoreId,
    pub description: Option<String>,
    pub address: Option<String>,
}
