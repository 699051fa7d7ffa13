use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use smartstore_core::{
    Action, BasketId, CustomerId, Entity, EntityKind, ErrorKind, InventoryId, ProductId, StoreError,
    StoreId, StoreResult,
};
use smartstore_customers::Customer;
use smartstore_inventory::Inventory;
use smartstore_stores::Store;

#[derive(Debug, Default)]
struct BasketState {
    /// Quantity held per product; never holds a zero entry.
    items: BTreeMap<ProductId, i64>,
    /// Units held per source slot. For each product the tallies sum to its
    /// entry in `items`.
    sources: BTreeMap<InventoryId, (Arc<Inventory>, i64)>,
    customer_id: Option<CustomerId>,
    store_id: Option<StoreId>,
}

impl BasketState {
    fn take_from(&mut self, slot: &Arc<Inventory>, count: i64) {
        self.sources
            .entry(slot.id().clone())
            .or_insert_with(|| (slot.clone(), 0))
            .1 += count;
    }

    /// Debit `count` units of `product_id` that went back to `slot`: its own
    /// tally first, then the product's other sources.
    fn give_back(&mut self, product_id: &ProductId, slot: &Inventory, mut count: i64) {
        let mut order: Vec<InventoryId> = vec![slot.id().clone()];
        order.extend(
            self.sources
                .iter()
                .filter(|(id, (source, _))| *id != slot.id() && source.holds(product_id))
                .map(|(id, _)| id.clone()),
        );
        for id in order {
            if count == 0 {
                break;
            }
            if let Some((_, tally)) = self.sources.get_mut(&id) {
                let debit = count.min(*tally);
                *tally -= debit;
                count -= debit;
                if *tally == 0 {
                    self.sources.remove(&id);
                }
            }
        }
    }
}

#[derive(Debug)]
pub struct Basket {
    id: BasketId,
    state: Mutex<BasketState>,
}

impl Basket {
    pub fn create(id: BasketId) -> Self {
        Self {
            id,
            state: Mutex::new(BasketState::default()),
        }
    }

    /// Customer and store this basket is linked to, if assigned.
    pub fn assignment(&self) -> Option<(CustomerId, StoreId)> {
        let state = self.state.lock();
        state.customer_id.clone().zip(state.store_id.clone())
    }

    pub fn customer_id(&self) -> Option<CustomerId> {
        self.state.lock().customer_id.clone()
    }

    pub fn store_id(&self) -> Option<StoreId> {
        self.state.lock().store_id.clone()
    }

    pub fn quantity(&self, product_id: &ProductId) -> i64 {
        self.state.lock().items.get(product_id).copied().unwrap_or(0)
    }

    pub fn items(&self) -> BTreeMap<ProductId, i64> {
        self.state.lock().items.clone()
    }

    /// Link this basket to `customer` inside `store`.
    ///
    /// Assigning the same basket to the same customer again changes nothing.
    pub fn assign(&self, customer: &Customer, store: &Store) -> StoreResult<()> {
        let mut state = self.state.lock();
        match &state.customer_id {
            Some(owner) if owner == customer.id() => return Ok(()),
            Some(_) => {
                return Err(StoreError::new(
                    Action::AssignBasket,
                    ErrorKind::BasketAlreadyAssigned,
                ));
            }
            None => {}
        }
        if customer.location().is_none() {
            return Err(StoreError::new(Action::AssignBasket, ErrorKind::CustomerNotLocated));
        }

        customer.attach_basket(&self.id)?;
        state.customer_id = Some(customer.id().clone());
        state.store_id = Some(store.id().clone());
        store.add_basket(self.id.clone());
        Ok(())
    }

    /// Take `count` units of `product_id` from the shelf in the customer's
    /// aisle. Returns the slot the units came from.
    pub fn add_product(
        &self,
        customer: &Customer,
        store: &Store,
        product_id: &ProductId,
        count: i64,
    ) -> StoreResult<Arc<Inventory>> {
        let action = Action::AddProduct;
        if customer.is_guest() {
            return Err(StoreError::new(action, ErrorKind::GuestNotAllowed));
        }

        let mut state = self.state.lock();
        Self::ensure_owner(&state, customer, action)?;
        if count <= 0 {
            return Err(StoreError::new(action, ErrorKind::InvalidQuantity(count)));
        }

        let slot = Self::reachable_slot(customer, store, product_id, action)?;
        let remaining = slot.withdraw(count, action)?;
        *state.items.entry(product_id.clone()).or_insert(0) += count;
        state.take_from(&slot, count);

        tracing::debug!(
            basket_id = %self.id,
            product_id = %product_id,
            count,
            shelf_remaining = remaining,
            "product added to basket"
        );
        Ok(slot)
    }

    /// Put `count` units of `product_id` back on the shelf in the customer's
    /// aisle. Returns the slot the units went to.
    pub fn remove_product(
        &self,
        customer: &Customer,
        store: &Store,
        product_id: &ProductId,
        count: i64,
    ) -> StoreResult<Arc<Inventory>> {
        let action = Action::RemoveProduct;
        let mut state = self.state.lock();
        Self::ensure_owner(&state, customer, action)?;
        if count <= 0 {
            return Err(StoreError::new(action, ErrorKind::InvalidQuantity(count)));
        }
        self.remove_locked(&mut state, customer, store, product_id, count, action)
    }

    /// Return every held unit to the slot it was taken from, then unlink
    /// basket, customer and store. Returns the slots that received units.
    ///
    /// The customer's current aisle does not matter. If any slot lacks room
    /// nothing changes. `store` is `None` when the basket's store no longer
    /// exists.
    pub fn clear(&self, customer: &Customer, store: Option<&Store>) -> StoreResult<Vec<Arc<Inventory>>> {
        let action = Action::ClearBasket;
        let mut state = self.state.lock();
        Self::ensure_owner(&state, customer, action)?;

        let returns: Vec<(&Inventory, i64)> = state
            .sources
            .values()
            .map(|(slot, quantity)| (slot.as_ref(), *quantity))
            .collect();
        Inventory::restock_all(&returns, action)?;
        let touched: Vec<Arc<Inventory>> = std::mem::take(&mut state.sources)
            .into_values()
            .map(|(slot, _)| slot)
            .collect();
        state.items.clear();

        customer.detach_basket();
        state.customer_id = None;
        state.store_id = None;
        if let Some(store) = store {
            store.remove_basket(&self.id);
        }

        tracing::debug!(basket_id = %self.id, returned_slots = touched.len(), "basket cleared");
        Ok(touched)
    }

    pub fn view(&self) -> BasketView {
        let state = self.state.lock();
        BasketView {
            id: self.id.clone(),
            customer_id: state.customer_id.clone(),
            store_id: state.store_id.clone(),
            items: state
                .items
                .iter()
                .map(|(product_id, quantity)| BasketItem {
                    product_id: product_id.clone(),
                    quantity: *quantity,
                })
                .collect(),
        }
    }

    fn remove_locked(
        &self,
        state: &mut BasketState,
        customer: &Customer,
        store: &Store,
        product_id: &ProductId,
        count: i64,
        action: Action,
    ) -> StoreResult<Arc<Inventory>> {
        let held = state
            .items
            .get(product_id)
            .copied()
            .ok_or_else(|| StoreError::new(action, ErrorKind::ProductNotInBasket))?;
        if count > held {
            return Err(StoreError::new(
                action,
                ErrorKind::RemoveExceedsHeld {
                    requested: count,
                    held,
                },
            ));
        }

        let slot = Self::reachable_slot(customer, store, product_id, action)?;
        let shelf_count = slot.restock(count, action)?;
        if held == count {
            state.items.remove(product_id);
        } else {
            state.items.insert(product_id.clone(), held - count);
        }
        state.give_back(product_id, &slot, count);

        tracing::debug!(
            basket_id = %self.id,
            product_id = %product_id,
            count,
            shelf_count,
            "product returned to shelf"
        );
        Ok(slot)
    }

    fn ensure_owner(state: &BasketState, customer: &Customer, action: Action) -> StoreResult<()> {
        match &state.customer_id {
            Some(owner) if owner == customer.id() => Ok(()),
            _ => Err(StoreError::new(action, ErrorKind::BasketNotAssigned)),
        }
    }

    /// The one slot stocking `product_id` in the aisle the customer stands in.
    fn reachable_slot(
        customer: &Customer,
        store: &Store,
        product_id: &ProductId,
        action: Action,
    ) -> StoreResult<Arc<Inventory>> {
        let location = customer
            .location()
            .ok_or_else(|| StoreError::new(action, ErrorKind::CustomerNotLocated))?;
        if &location.store_id != store.id() {
            return Err(StoreError::new(action, ErrorKind::ProductNotNearCustomer));
        }
        store
            .get_aisle(&location.aisle_id)?
            .locate_product(product_id, action)
    }
}

impl Entity for Basket {
    type Id = BasketId;
    const KIND: EntityKind = EntityKind::Basket;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// One basket line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketItem {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Serializable projection of a basket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketView {
    pub id: BasketId,
    pub customer_id: Option<CustomerId>,
    pub store_id: Option<StoreId>,
    pub items: Vec<BasketItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartstore_core::{AisleId, InventoryId, InventoryLocation, Reason, ShelfId, StoreLocation};
    use smartstore_customers::{CreateCustomer, CustomerType};
    use smartstore_inventory::{CreateInventory, InventoryType};
    use smartstore_products::Temperature;
    use smartstore_stores::{AisleLocation, CreateAisle, CreateShelf, CreateStore, ShelfLevel};

    struct Fixture {
        store: Store,
        customer: Customer,
        basket: Basket,
        slot: Arc<Inventory>,
    }

    fn prod7() -> ProductId {
        ProductId::new("PROD007")
    }

    fn fixture(kind: CustomerType, count: i64) -> Fixture {
        let store = Store::create(CreateStore {
            store_id: StoreId::new("store_1"),
            address: "1 Main St".to_string(),
            description: "test store".to_string(),
        });
        let aisle = store
            .add_aisle(CreateAisle {
                aisle_id: AisleId::new("aisle_A"),
                name: "snacks".to_string(),
                description: String::new(),
                location: AisleLocation::Floor,
            })
            .unwrap();
        let shelf = aisle
            .add_shelf(CreateShelf {
                shelf_id: ShelfId::new("shelf_1"),
                name: "top".to_string(),
                level: ShelfLevel::High,
                description: String::new(),
                temperature: Temperature::Ambient,
            })
            .unwrap();
        let slot = shelf
            .add_inventory(&CreateInventory {
                inventory_id: InventoryId::new("inv_1"),
                location: InventoryLocation::new("store_1", "aisle_A", "shelf_1"),
                capacity: 10,
                count,
                product_id: prod7(),
                kind: InventoryType::Standard,
            })
            .unwrap();

        let customer = Customer::create(CreateCustomer {
            customer_id: CustomerId::new("cust_1"),
            first_name: "Sam".to_string(),
            last_name: "Lee".to_string(),
            kind,
            email: "sam@example.com".to_string(),
            account_address: "acct".to_string(),
        });
        customer.relocate(StoreLocation::new("store_1", "aisle_A"), None);

        let basket = Basket::create(BasketId::new("b1"));
        basket.assign(&customer, &store).unwrap();

        Fixture {
            store,
            customer,
            basket,
            slot,
        }
    }

    #[test]
    fn taking_more_than_the_shelf_holds_fails() {
        let f = fixture(CustomerType::Registered, 5);
        f.basket.add_product(&f.customer, &f.store, &prod7(), 3).unwrap();
        assert_eq!(f.basket.quantity(&prod7()), 3);
        assert_eq!(f.slot.count(), 2);

        let err = f
            .basket
            .add_product(&f.customer, &f.store, &prod7(), 3)
            .unwrap_err();
        assert_eq!(
            err.kind(),
            &ErrorKind::InsufficientInventory {
                requested: 3,
                available: 2
            }
        );
        assert_eq!(f.basket.quantity(&prod7()), 3);
        assert_eq!(f.slot.count(), 2);
    }

    #[test]
    fn guests_cannot_shop() {
        let f = fixture(CustomerType::Guest, 5);
        let err = f
            .basket
            .add_product(&f.customer, &f.store, &prod7(), 1)
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::GuestNotAllowed);
        assert_eq!(f.slot.count(), 5);
    }

    #[test]
    fn removing_more_than_held_leaves_state_unchanged() {
        let f = fixture(CustomerType::Registered, 5);
        f.basket.add_product(&f.customer, &f.store, &prod7(), 3).unwrap();

        let err = f
            .basket
            .remove_product(&f.customer, &f.store, &prod7(), 4)
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::RemoveExceedsHeld { requested: 4, held: 3 });
        assert_eq!(f.basket.quantity(&prod7()), 3);
        assert_eq!(f.slot.count(), 2);

        let err = f
            .basket
            .remove_product(&f.customer, &f.store, &ProductId::new("PROD008"), 1)
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ProductNotInBasket);
    }

    #[test]
    fn remove_to_zero_drops_the_line() {
        let f = fixture(CustomerType::Registered, 5);
        f.basket.add_product(&f.customer, &f.store, &prod7(), 2).unwrap();
        f.basket.remove_product(&f.customer, &f.store, &prod7(), 2).unwrap();
        assert!(f.basket.items().is_empty());
        assert_eq!(f.slot.count(), 5);
    }

    #[test]
    fn product_in_another_aisle_is_out_of_reach() {
        let f = fixture(CustomerType::Registered, 5);
        f.store
            .add_aisle(CreateAisle {
                aisle_id: AisleId::new("aisle_B"),
                name: "drinks".to_string(),
                description: String::new(),
                location: AisleLocation::Floor,
            })
            .unwrap();
        f.customer.relocate(StoreLocation::new("store_1", "aisle_B"), None);

        let err = f
            .basket
            .add_product(&f.customer, &f.store, &prod7(), 1)
            .unwrap_err();
        assert_eq!(err.reason(), Reason::LocationMismatch);
    }

    #[test]
    fn clear_returns_units_and_unlinks_everything() {
        let f = fixture(CustomerType::Registered, 5);
        f.basket.add_product(&f.customer, &f.store, &prod7(), 4).unwrap();

        let touched = f.basket.clear(&f.customer, Some(&f.store)).unwrap();
        assert_eq!(touched.len(), 1);
        assert_eq!(f.slot.count(), 5);
        assert!(f.basket.items().is_empty());
        assert!(f.basket.assignment().is_none());
        assert!(f.customer.basket_id().is_none());
        assert!(!f.store.has_basket(&BasketId::new("b1")));
    }

    /// Adds aisle_B holding `PROD008` in slot `inv_2` (capacity 10).
    fn second_aisle(store: &Store, count: i64) -> Arc<Inventory> {
        let aisle = store
            .add_aisle(CreateAisle {
                aisle_id: AisleId::new("aisle_B"),
                name: "drinks".to_string(),
                description: String::new(),
                location: AisleLocation::Floor,
            })
            .unwrap();
        let shelf = aisle
            .add_shelf(CreateShelf {
                shelf_id: ShelfId::new("shelf_2"),
                name: "low".to_string(),
                level: ShelfLevel::Low,
                description: String::new(),
                temperature: Temperature::Ambient,
            })
            .unwrap();
        shelf
            .add_inventory(&CreateInventory {
                inventory_id: InventoryId::new("inv_2"),
                location: InventoryLocation::new("store_1", "aisle_B", "shelf_2"),
                capacity: 10,
                count,
                product_id: ProductId::new("PROD008"),
                kind: InventoryType::Standard,
            })
            .unwrap()
    }

    #[test]
    fn clear_returns_units_picked_in_several_aisles() {
        let f = fixture(CustomerType::Registered, 5);
        let drinks = second_aisle(&f.store, 5);

        f.customer.relocate(StoreLocation::new("store_1", "aisle_B"), None);
        f.basket
            .add_product(&f.customer, &f.store, &ProductId::new("PROD008"), 2)
            .unwrap();
        f.customer.relocate(StoreLocation::new("store_1", "aisle_A"), None);
        f.basket.add_product(&f.customer, &f.store, &prod7(), 2).unwrap();

        let touched = f.basket.clear(&f.customer, Some(&f.store)).unwrap();
        assert_eq!(touched.len(), 2);
        assert_eq!(f.slot.count(), 5);
        assert_eq!(drinks.count(), 5);
        assert!(f.basket.items().is_empty());
        assert!(f.customer.basket_id().is_none());
    }

    #[test]
    fn clear_without_room_changes_nothing() {
        let f = fixture(CustomerType::Registered, 5);
        let drinks = second_aisle(&f.store, 5);

        f.basket.add_product(&f.customer, &f.store, &prod7(), 4).unwrap();
        f.customer.relocate(StoreLocation::new("store_1", "aisle_B"), None);
        f.basket
            .add_product(&f.customer, &f.store, &ProductId::new("PROD008"), 2)
            .unwrap();
        drinks.update(7).unwrap();

        let err = f.basket.clear(&f.customer, Some(&f.store)).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::CapacityExceeded { returned: 2, free: 0 });
        assert_eq!(f.slot.count(), 1);
        assert_eq!(drinks.count(), 10);
        assert_eq!(f.basket.quantity(&prod7()), 4);
        assert_eq!(f.basket.quantity(&ProductId::new("PROD008")), 2);
        assert_eq!(f.customer.basket_id(), Some(BasketId::new("b1")));
        assert!(f.store.has_basket(&BasketId::new("b1")));
    }

    #[test]
    fn clear_tolerates_a_missing_store() {
        let f = fixture(CustomerType::Registered, 5);
        f.basket.add_product(&f.customer, &f.store, &prod7(), 3).unwrap();

        f.basket.clear(&f.customer, None).unwrap();
        assert_eq!(f.slot.count(), 5);
        assert!(f.basket.assignment().is_none());
    }

    #[test]
    fn basket_belongs_to_one_customer() {
        let f = fixture(CustomerType::Registered, 5);
        f.basket.assign(&f.customer, &f.store).unwrap();

        let other = Customer::create(CreateCustomer {
            customer_id: CustomerId::new("cust_2"),
            first_name: "Kim".to_string(),
            last_name: "Park".to_string(),
            kind: CustomerType::Registered,
            email: String::new(),
            account_address: String::new(),
        });
        other.relocate(StoreLocation::new("store_1", "aisle_A"), None);

        let err = f.basket.assign(&other, &f.store).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::BasketAlreadyAssigned);

        let err = f.basket.add_product(&other, &f.store, &prod7(), 1).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::BasketNotAssigned);
    }

    #[test]
    fn unlocated_customer_cannot_take_a_basket() {
        let customer = Customer::create(CreateCustomer {
            customer_id: CustomerId::new("cust_9"),
            first_name: "No".to_string(),
            last_name: "Where".to_string(),
            kind: CustomerType::Registered,
            email: String::new(),
            account_address: String::new(),
        });
        let store = Store::create(CreateStore {
            store_id: StoreId::new("store_1"),
            address: String::new(),
            description: String::new(),
        });
        let err = Basket::create(BasketId::new("b9"))
            .assign(&customer, &store)
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::CustomerNotLocated);
    }

    #[test]
    fn parallel_shoppers_conserve_units() {
        let f = fixture(CustomerType::Registered, 10);
        let Fixture {
            store,
            customer,
            basket,
            slot,
        } = f;

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..10 {
                        let _ = basket.add_product(&customer, &store, &prod7(), 1);
                        let _ = basket.remove_product(&customer, &store, &prod7(), 1);
                    }
                });
            }
        });

        assert_eq!(basket.quantity(&prod7()) + slot.count(), 10);
        assert!(slot.count() >= 0);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 200,
                ..ProptestConfig::default()
            })]

            /// Property: held + shelf count is conserved across any add/remove sequence.
            #[test]
            fn units_are_conserved(ops in prop::collection::vec((any::<bool>(), 1i64..6), 0..40)) {
                let f = fixture(CustomerType::Registered, 10);
                for (add, count) in ops {
                    let _ = if add {
                        f.basket.add_product(&f.customer, &f.store, &prod7(), count)
                    } else {
                        f.basket.remove_product(&f.customer, &f.store, &prod7(), count)
                    };
                    prop_assert_eq!(f.basket.quantity(&prod7()) + f.slot.count(), 10);
                }
            }
        }
    }
}
