use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;

use smartstore_baskets::{Basket, BasketView};
use smartstore_core::{
    Action, BasketId, CustomerId, DeviceId, Entity, EntityKind, ErrorKind, InventoryId,
    InventoryLocation, ProductId, StoreError, StoreId, StoreLocation, StoreResult,
};
use smartstore_customers::{CreateCustomer, Customer, CustomerView};
use smartstore_devices::{CreateDevice, Device, DeviceKind, DeviceView};
use smartstore_inventory::{CreateInventory, Inventory, InventoryView};
use smartstore_products::{CreateProduct, Product, ProductView};
use smartstore_stores::{AisleView, CreateStore, ShelfView, Store, StoreView};

use crate::commands::{ProvisionAisle, ProvisionDevice, ProvisionShelf, UpdateStore};
use crate::config::EngineConfig;
use crate::registry::Registry;
use crate::sink::{NoopSink, PersistenceSink, Record, SinkError, SinkPolicy};

/// The store transaction engine.
///
/// Every operation either fully applies or fails with a [`StoreError`]
/// naming the operation and the condition. Failures raised deep in the
/// hierarchy (a missing aisle, an exhausted slot) are returned unchanged.
///
/// ## Locking
///
/// Registries are sharded concurrent maps; lookups clone an `Arc` and release
/// the shard immediately. Basket operations hold the basket lock for their
/// whole duration, and take locks in the order basket → customer →
/// store/aisle/shelf maps → inventory slot.
pub struct StoreService {
    stores: Registry<Store>,
    products: Registry<Product>,
    customers: Registry<Customer>,
    baskets: Registry<Basket>,
    devices: Registry<Device>,
    inventory: Registry<Inventory>,
    /// Authoritative customer → store membership.
    memberships: DashMap<CustomerId, StoreId>,
    sink: Arc<dyn PersistenceSink>,
    sink_policy: SinkPolicy,
}

impl Default for StoreService {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreService {
    /// Engine with no persistence.
    pub fn new() -> Self {
        Self::with_sink(Arc::new(NoopSink), SinkPolicy::Strict)
    }

    pub fn with_sink(sink: Arc<dyn PersistenceSink>, sink_policy: SinkPolicy) -> Self {
        Self {
            stores: Registry::new(),
            products: Registry::new(),
            customers: Registry::new(),
            baskets: Registry::new(),
            devices: Registry::new(),
            inventory: Registry::new(),
            memberships: DashMap::new(),
            sink,
            sink_policy,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self, SinkError> {
        Ok(Self::with_sink(config.sink.build()?, config.sink_policy))
    }

    pub fn sink_policy(&self) -> SinkPolicy {
        self.sink_policy
    }

    /// Drop every entity. The sink is left untouched.
    pub fn reset(&self) {
        self.memberships.clear();
        self.baskets.clear();
        self.customers.clear();
        self.devices.clear();
        self.inventory.clear();
        self.products.clear();
        self.stores.clear();
        tracing::info!("store service reset");
    }

    // ------------------------------------------------------------------
    // Stores
    // ------------------------------------------------------------------

    pub fn provision_store(&self, cmd: CreateStore) -> StoreResult<StoreView> {
        let action = Action::ProvisionStore;
        let store = self.stores.insert_new(Store::create(cmd), action)?;
        tracing::info!(store_id = %store.id(), "store provisioned");

        let view = store.view();
        self.persist(action, Record::Store(view.clone()))?;
        Ok(view)
    }

    pub fn show_store(&self, store_id: &StoreId) -> StoreResult<StoreView> {
        Ok(self.stores.get(store_id, Action::ShowStore)?.view())
    }

    pub fn update_store(&self, cmd: UpdateStore) -> StoreResult<StoreView> {
        let action = Action::UpdateStore;
        let store = self.stores.get(&cmd.store_id, action)?;
        store.update(cmd.description, cmd.address);
        tracing::info!(store_id = %cmd.store_id, "store updated");

        let view = store.view();
        self.persist(action, Record::Store(view.clone()))?;
        Ok(view)
    }

    /// Remove a store from the registry. Children are not cascaded.
    pub fn delete_store(&self, store_id: &StoreId) -> StoreResult<StoreView> {
        let action = Action::DeleteStore;
        let store = self
            .stores
            .remove(store_id)
            .ok_or_else(|| StoreError::not_found(action, EntityKind::Store))?;
        tracing::info!(store_id = %store_id, "store deleted");

        let outcome = self.sink.remove(EntityKind::Store, store_id.as_str());
        self.settle(action, EntityKind::Store, outcome)?;
        Ok(store.view())
    }

    /// Every store, ordered by id.
    pub fn stores(&self) -> Vec<StoreView> {
        let mut views: Vec<StoreView> = self.stores.values().iter().map(|s| s.view()).collect();
        views.sort_by(|a, b| a.id.cmp(&b.id));
        views
    }

    /// Customers currently located in `store_id`, ordered by id.
    pub fn store_customers(&self, store_id: &StoreId) -> StoreResult<Vec<CustomerView>> {
        if !self.stores.contains(store_id) {
            return Err(StoreError::not_found(Action::ShowStore, EntityKind::Store));
        }
        let members: Vec<CustomerId> = self
            .memberships
            .iter()
            .filter(|entry| entry.value() == store_id)
            .map(|entry| entry.key().clone())
            .collect();

        let mut views: Vec<CustomerView> = members
            .iter()
            .filter_map(|id| self.customers.find(id))
            .map(|customer| customer.view())
            .collect();
        views.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(views)
    }

    // ------------------------------------------------------------------
    // Aisles and shelves
    // ------------------------------------------------------------------

    pub fn provision_aisle(&self, cmd: ProvisionAisle) -> StoreResult<AisleView> {
        let action = Action::ProvisionAisle;
        let store = self.stores.get(&cmd.location.store_id, action)?;
        let aisle = store.add_aisle(cmd.to_create())?;
        tracing::info!(location = %cmd.location, "aisle provisioned");

        let view = aisle.view();
        self.persist(
            action,
            Record::Aisle {
                location: cmd.location,
                aisle: view.clone(),
            },
        )?;
        Ok(view)
    }

    pub fn show_aisle(&self, location: &StoreLocation) -> StoreResult<AisleView> {
        let store = self.stores.get(&location.store_id, Action::ShowAisle)?;
        Ok(store.get_aisle(&location.aisle_id)?.view())
    }

    pub fn provision_shelf(&self, cmd: ProvisionShelf) -> StoreResult<ShelfView> {
        let action = Action::ProvisionShelf;
        let store = self.stores.get(cmd.store_id(), action)?;
        let aisle = store.get_aisle(cmd.aisle_id())?;
        let shelf = aisle.add_shelf(cmd.to_create())?;
        tracing::info!(location = %cmd.location, level = %cmd.level, "shelf provisioned");

        let view = shelf.view();
        self.persist(
            action,
            Record::Shelf {
                location: cmd.location,
                shelf: view.clone(),
            },
        )?;
        Ok(view)
    }

    pub fn show_shelf(&self, location: &InventoryLocation) -> StoreResult<ShelfView> {
        let store = self.stores.get(&location.store_id, Action::ShowShelf)?;
        let aisle = store.get_aisle(&location.aisle_id)?;
        Ok(aisle.get_shelf(&location.shelf_id)?.view())
    }

    // ------------------------------------------------------------------
    // Products and inventory
    // ------------------------------------------------------------------

    pub fn provision_product(&self, cmd: CreateProduct) -> StoreResult<ProductView> {
        let action = Action::ProvisionProduct;
        let product = self.products.insert_new(Product::create(cmd), action)?;
        tracing::info!(product_id = %product.id(), "product provisioned");

        let view = product.view();
        self.persist(action, Record::Product(view.clone()))?;
        Ok(view)
    }

    pub fn show_product(&self, product_id: &ProductId) -> StoreResult<ProductView> {
        Ok(self.products.get(product_id, Action::ShowProduct)?.view())
    }

    /// Place a new inventory slot on a shelf.
    ///
    /// Checks run store → aisle → shelf → product → temperature → id before
    /// anything is created.
    pub fn provision_inventory(&self, cmd: CreateInventory) -> StoreResult<InventoryView> {
        let action = Action::ProvisionInventory;
        let location = &cmd.location;
        let store = self.stores.get(&location.store_id, action)?;
        let aisle = store.get_aisle(&location.aisle_id)?;
        let shelf = aisle.get_shelf(&location.shelf_id)?;
        let product = self.products.get(&cmd.product_id, action)?;
        if shelf.temperature() != product.temperature() {
            tracing::warn!(
                inventory_id = %cmd.inventory_id,
                shelf = %shelf.temperature(),
                product = %product.temperature(),
                "inventory rejected: temperature mismatch"
            );
            return Err(StoreError::new(action, ErrorKind::TemperatureMismatch));
        }

        let slot = self
            .inventory
            .try_insert_with(cmd.inventory_id.clone(), action, || {
                let slot = shelf.add_inventory(&cmd)?;
                store.index_inventory(slot.clone());
                Ok(slot)
            })?;
        tracing::info!(
            inventory_id = %slot.id(),
            location = %slot.location(),
            product_id = %slot.product_id(),
            count = slot.count(),
            capacity = slot.capacity(),
            "inventory provisioned"
        );

        let view = slot.view();
        self.persist(action, Record::Inventory(view.clone()))?;
        Ok(view)
    }

    pub fn show_inventory(&self, inventory_id: &InventoryId) -> StoreResult<InventoryView> {
        Ok(self.inventory.get(inventory_id, Action::ShowInventory)?.view())
    }

    /// Apply a signed adjustment to a slot's count.
    pub fn update_inventory(&self, inventory_id: &InventoryId, delta: i64) -> StoreResult<InventoryView> {
        let action = Action::UpdateInventory;
        let slot = self.inventory.get(inventory_id, action)?;
        let count = slot.update(delta)?;
        tracing::debug!(inventory_id = %inventory_id, delta, count, "inventory updated");

        let view = slot.view();
        self.persist(action, Record::Inventory(view.clone()))?;
        Ok(view)
    }

    // ------------------------------------------------------------------
    // Customers
    // ------------------------------------------------------------------

    pub fn provision_customer(&self, cmd: CreateCustomer) -> StoreResult<CustomerView> {
        let action = Action::ProvisionCustomer;
        let customer = self.customers.insert_new(Customer::create(cmd), action)?;
        tracing::info!(customer_id = %customer.id(), kind = %customer.kind(), "customer provisioned");

        let view = customer.view();
        self.persist(action, Record::Customer(view.clone()))?;
        Ok(view)
    }

    pub fn show_customer(&self, customer_id: &CustomerId) -> StoreResult<CustomerView> {
        Ok(self.customers.get(customer_id, Action::ShowCustomer)?.view())
    }

    /// Move a customer to `location`.
    ///
    /// Moving within the current store (or placing a customer for the first
    /// time) refreshes last-seen. Moving to another store first returns every
    /// unit in the held basket to the old store's shelves and detaches the
    /// basket; last-seen is then unset until the customer is seen again.
    pub fn update_customer(
        &self,
        customer_id: &CustomerId,
        location: StoreLocation,
    ) -> StoreResult<CustomerView> {
        let action = Action::UpdateCustomer;
        let store = self.stores.get(&location.store_id, action)?;
        store.get_aisle(&location.aisle_id)?;
        let customer = self.customers.get(customer_id, action)?;

        // The guard is dropped before any basket or sink work.
        let previous = self.memberships.get(customer_id).map(|member| member.value().clone());
        match previous {
            Some(previous) if previous != location.store_id => {
                if let Some(basket_id) = customer.basket_id() {
                    self.release_basket(&customer, &basket_id, &previous, action)?;
                }
                customer.relocate(location.clone(), None);
                self.memberships
                    .insert(customer_id.clone(), location.store_id.clone());
                tracing::info!(
                    customer_id = %customer_id,
                    from = %previous,
                    to = %location,
                    "customer transferred between stores"
                );
            }
            Some(_) => {
                customer.relocate(location.clone(), Some(Utc::now()));
                tracing::debug!(customer_id = %customer_id, location = %location, "customer moved");
            }
            None => {
                customer.relocate(location.clone(), Some(Utc::now()));
                self.memberships
                    .insert(customer_id.clone(), location.store_id.clone());
                tracing::info!(customer_id = %customer_id, location = %location, "customer entered store");
            }
        }

        let view = customer.view();
        self.persist(action, Record::Customer(view.clone()))?;
        Ok(view)
    }

    /// Empty and detach a basket held in `store_id`. Units go back to the
    /// slots they came from; a deleted store only skips its basket index.
    fn release_basket(
        &self,
        customer: &Customer,
        basket_id: &BasketId,
        store_id: &StoreId,
        action: Action,
    ) -> StoreResult<()> {
        let basket = self.baskets.get(basket_id, action)?;
        let store = self.stores.find(store_id);
        if store.is_none() {
            tracing::warn!(%basket_id, %store_id, "releasing basket of a deleted store");
        }
        let touched = basket.clear(customer, store.as_deref())?;
        tracing::info!(
            basket_id = %basket_id,
            customer_id = %customer.id(),
            returned_slots = touched.len(),
            "basket released"
        );

        for slot in touched {
            self.persist(action, Record::Inventory(slot.view()))?;
        }
        self.persist(action, Record::Basket(basket.view()))
    }

    // ------------------------------------------------------------------
    // Baskets
    // ------------------------------------------------------------------

    pub fn provision_basket(&self, basket_id: BasketId) -> StoreResult<BasketView> {
        let action = Action::ProvisionBasket;
        let basket = self.baskets.insert_new(Basket::create(basket_id), action)?;
        tracing::info!(basket_id = %basket.id(), "basket provisioned");

        let view = basket.view();
        self.persist(action, Record::Basket(view.clone()))?;
        Ok(view)
    }

    /// Hand a basket to a customer in the store they are standing in.
    pub fn assign_customer_basket(
        &self,
        customer_id: &CustomerId,
        basket_id: &BasketId,
    ) -> StoreResult<BasketView> {
        let action = Action::AssignBasket;
        let customer = self.customers.get(customer_id, action)?;
        let basket = self.baskets.get(basket_id, action)?;
        let location = customer
            .location()
            .ok_or_else(|| StoreError::new(action, ErrorKind::CustomerNotLocated))?;
        let store = self.stores.get(&location.store_id, action)?;

        basket
            .assign(&customer, &store)
            .inspect_err(|err| tracing::warn!(%basket_id, %customer_id, error = %err, "basket assignment rejected"))?;
        tracing::info!(%basket_id, %customer_id, store_id = %store.id(), "basket assigned");

        let view = basket.view();
        self.persist(action, Record::Basket(view.clone()))?;
        self.persist(action, Record::Customer(customer.view()))?;
        Ok(view)
    }

    pub fn get_customer_basket(&self, customer_id: &CustomerId) -> StoreResult<BasketView> {
        let action = Action::GetCustomerBasket;
        let customer = self.customers.get(customer_id, action)?;
        let basket_id = customer
            .basket_id()
            .ok_or_else(|| StoreError::new(action, ErrorKind::CustomerHasNoBasket))?;
        Ok(self.baskets.get(&basket_id, action)?.view())
    }

    pub fn add_basket_product(
        &self,
        basket_id: &BasketId,
        product_id: &ProductId,
        count: i64,
    ) -> StoreResult<BasketView> {
        let action = Action::AddProduct;
        let (basket, customer, store) = self.basket_context(basket_id, Some(product_id), action)?;

        let slot = basket
            .add_product(&customer, &store, product_id, count)
            .inspect_err(|err| tracing::warn!(%basket_id, %product_id, count, error = %err, "add to basket rejected"))?;

        let view = basket.view();
        self.persist(action, Record::Inventory(slot.view()))?;
        self.persist(action, Record::Basket(view.clone()))?;
        Ok(view)
    }

    pub fn remove_basket_product(
        &self,
        basket_id: &BasketId,
        product_id: &ProductId,
        count: i64,
    ) -> StoreResult<BasketView> {
        let action = Action::RemoveProduct;
        let (basket, customer, store) = self.basket_context(basket_id, Some(product_id), action)?;

        let slot = basket
            .remove_product(&customer, &store, product_id, count)
            .inspect_err(|err| tracing::warn!(%basket_id, %product_id, count, error = %err, "remove from basket rejected"))?;

        let view = basket.view();
        self.persist(action, Record::Inventory(slot.view()))?;
        self.persist(action, Record::Basket(view.clone()))?;
        Ok(view)
    }

    /// Return everything in the basket to the shelves and detach it.
    pub fn clear_basket(&self, basket_id: &BasketId) -> StoreResult<BasketView> {
        let action = Action::ClearBasket;
        let (basket, customer, store) = self.basket_context(basket_id, None, action)?;

        let touched = basket
            .clear(&customer, Some(&store))
            .inspect_err(|err| tracing::warn!(%basket_id, error = %err, "basket clear rejected"))?;
        tracing::info!(%basket_id, returned_slots = touched.len(), "basket cleared");

        for slot in touched {
            self.persist(action, Record::Inventory(slot.view()))?;
        }
        let view = basket.view();
        self.persist(action, Record::Basket(view.clone()))?;
        self.persist(action, Record::Customer(customer.view()))?;
        Ok(view)
    }

    /// Works for unassigned baskets too.
    pub fn show_basket(&self, basket_id: &BasketId) -> StoreResult<BasketView> {
        Ok(self.baskets.get(basket_id, Action::ShowBasket)?.view())
    }

    /// Resolve a basket with its customer and store, checking in order:
    /// basket exists, product exists, basket is assigned.
    fn basket_context(
        &self,
        basket_id: &BasketId,
        product_id: Option<&ProductId>,
        action: Action,
    ) -> StoreResult<(Arc<Basket>, Arc<Customer>, Arc<Store>)> {
        let basket = self.baskets.get(basket_id, action)?;
        if let Some(product_id) = product_id {
            self.products.get(product_id, action)?;
        }
        let (customer_id, store_id) = basket
            .assignment()
            .ok_or_else(|| StoreError::new(action, ErrorKind::BasketNotAssigned))?;
        let customer = self.customers.get(&customer_id, action)?;
        let store = self.stores.get(&store_id, action)?;
        Ok((basket, customer, store))
    }

    // ------------------------------------------------------------------
    // Devices
    // ------------------------------------------------------------------

    pub fn provision_device(&self, cmd: ProvisionDevice) -> StoreResult<DeviceView> {
        let action = Action::ProvisionDevice;
        let store = self.stores.get(&cmd.location.store_id, action)?;
        store.get_aisle(&cmd.location.aisle_id)?;
        let kind: DeviceKind = cmd.device_type.parse().map_err(|_| {
            StoreError::new(action, ErrorKind::UnknownDeviceType(cmd.device_type.clone()))
        })?;

        let device = self.devices.try_insert_with(cmd.device_id.clone(), action, || {
            let device = Arc::new(Device::create(CreateDevice {
                device_id: cmd.device_id.clone(),
                name: cmd.name.clone(),
                kind,
                location: cmd.location.clone(),
            }));
            store.add_device(device.clone())?;
            Ok(device)
        })?;
        tracing::info!(device_id = %device.id(), kind = %kind, location = %cmd.location, "device provisioned");

        let view = device.view();
        self.persist(action, Record::Device(view.clone()))?;
        Ok(view)
    }

    pub fn show_device(&self, device_id: &DeviceId) -> StoreResult<DeviceView> {
        Ok(self.devices.get(device_id, Action::ShowDevice)?.view())
    }

    /// Deliver an event to the device's handler.
    pub fn raise_event(&self, device_id: &DeviceId, event: &str) -> StoreResult<String> {
        let device = self.devices.get(device_id, Action::RaiseEvent)?;
        Ok(device.process_event(event))
    }

    /// Send a command to an appliance. Sensors reject commands.
    pub fn issue_command(&self, device_id: &DeviceId, command: &str) -> StoreResult<String> {
        let device = self.devices.get(device_id, Action::IssueCommand)?;
        device.process_command(command)
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    fn persist(&self, action: Action, record: Record) -> StoreResult<()> {
        let kind = record.kind();
        let outcome = self.sink.upsert(&record);
        self.settle(action, kind, outcome)
    }

    fn settle(
        &self,
        action: Action,
        kind: EntityKind,
        outcome: Result<(), SinkError>,
    ) -> StoreResult<()> {
        let Err(err) = outcome else {
            return Ok(());
        };
        tracing::warn!(%action, entity = %kind, error = %err, policy = ?self.sink_policy, "sink write failed");
        match self.sink_policy {
            SinkPolicy::BestEffort => Ok(()),
            SinkPolicy::Strict => Err(StoreError::new(
                action,
                ErrorKind::Persistence(err.to_string()),
            )),
        }
    }
}
