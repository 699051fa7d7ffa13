use core::str::FromStr;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use smartstore_core::{
    Action, Entity, EntityKind, ErrorKind, InventoryId, InventoryLocation, ParseError, ProductId,
    StoreError, StoreResult,
};

/// How a slot is stocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InventoryType {
    Standard,
    Flexible,
}

impl InventoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InventoryType::Standard => "standard",
            InventoryType::Flexible => "flexible",
        }
    }
}

impl core::fmt::Display for InventoryType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InventoryType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(InventoryType::Standard),
            "flexible" => Ok(InventoryType::Flexible),
            _ => Err(ParseError::unknown("inventory type", s)),
        }
    }
}

/// Command: CreateInventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateInventory {
    pub inventory_id: InventoryId,
    pub location: InventoryLocation,
    pub capacity: i64,
    pub count: i64,
    pub product_id: ProductId,
    pub kind: InventoryType,
}

/// A stocked quantity of one product at one shelf slot.
#[derive(Debug)]
pub struct Inventory {
    id: InventoryId,
    location: InventoryLocation,
    capacity: i64,
    product_id: ProductId,
    kind: InventoryType,
    count: Mutex<i64>,
}

impl Inventory {
    /// Build a slot, rejecting a count outside `0..=capacity`.
    pub fn create(cmd: &CreateInventory) -> StoreResult<Self> {
        if cmd.count < 0 || cmd.count > cmd.capacity {
            return Err(StoreError::new(
                Action::AddInventory,
                ErrorKind::OutOfBounds {
                    count: cmd.count,
                    capacity: cmd.capacity,
                },
            ));
        }

        Ok(Self {
            id: cmd.inventory_id.clone(),
            location: cmd.location.clone(),
            capacity: cmd.capacity,
            product_id: cmd.product_id.clone(),
            kind: cmd.kind,
            count: Mutex::new(cmd.count),
        })
    }

    pub fn location(&self) -> &InventoryLocation {
        &self.location
    }

    pub fn capacity(&self) -> i64 {
        self.capacity
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn kind(&self) -> InventoryType {
        self.kind
    }

    pub fn count(&self) -> i64 {
        *self.count.lock()
    }

    pub fn holds(&self, product_id: &ProductId) -> bool {
        &self.product_id == product_id
    }

    /// Apply a signed adjustment, keeping the count within `0..=capacity`.
    ///
    /// Returns the new count.
    pub fn update(&self, delta: i64) -> StoreResult<i64> {
        let mut count = self.count.lock();
        let next = count.saturating_add(delta);
        if next < 0 || next > self.capacity {
            return Err(StoreError::new(
                Action::UpdateInventory,
                ErrorKind::OutOfBounds {
                    count: next,
                    capacity: self.capacity,
                },
            ));
        }
        *count = next;
        Ok(next)
    }

    /// Take `quantity` units off the shelf. Returns the remaining count.
    pub fn withdraw(&self, quantity: i64, action: Action) -> StoreResult<i64> {
        let mut count = self.count.lock();
        if *count - quantity < 0 {
            return Err(StoreError::new(
                action,
                ErrorKind::InsufficientInventory {
                    requested: quantity,
                    available: *count,
                },
            ));
        }
        *count -= quantity;
        Ok(*count)
    }

    /// Put `quantity` units back on the shelf. Returns the new count.
    pub fn restock(&self, quantity: i64, action: Action) -> StoreResult<i64> {
        let mut count = self.count.lock();
        if *count + quantity > self.capacity {
            return Err(StoreError::new(
                action,
                ErrorKind::CapacityExceeded {
                    returned: quantity,
                    free: self.capacity - *count,
                },
            ));
        }
        *count += quantity;
        Ok(*count)
    }

    /// Put units back on several slots at once: either every slot takes its
    /// share or none changes.
    ///
    /// Slot locks are taken in id order and held until all counts are
    /// written. Repeated slots are merged.
    pub fn restock_all(returns: &[(&Inventory, i64)], action: Action) -> StoreResult<()> {
        let mut merged: Vec<(&Inventory, i64)> = Vec::with_capacity(returns.len());
        for &(slot, quantity) in returns {
            match merged.iter_mut().find(|(seen, _)| seen.id == slot.id) {
                Some((_, total)) => *total += quantity,
                None => merged.push((slot, quantity)),
            }
        }
        merged.sort_by(|(a, _), (b, _)| a.id.cmp(&b.id));

        let mut guards = Vec::with_capacity(merged.len());
        for (slot, quantity) in &merged {
            let count = slot.count.lock();
            if *count + quantity > slot.capacity {
                return Err(StoreError::new(
                    action,
                    ErrorKind::CapacityExceeded {
                        returned: *quantity,
                        free: slot.capacity - *count,
                    },
                ));
            }
            guards.push(count);
        }
        for (count, (_, quantity)) in guards.iter_mut().zip(&merged) {
            **count += quantity;
        }
        Ok(())
    }

    pub fn view(&self) -> InventoryView {
        InventoryView {
            id: self.id.clone(),
            location: self.location.clone(),
            capacity: self.capacity,
            count: self.count(),
            product_id: self.product_id.clone(),
            kind: self.kind,
        }
    }
}

impl Entity for Inventory {
    type Id = InventoryId;
    const KIND: EntityKind = EntityKind::Inventory;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Serializable projection of an inventory slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryView {
    pub id: InventoryId,
    pub location: InventoryLocation,
    pub capacity: i64,
    pub count: i64,
    pub product_id: ProductId,
    pub kind: InventoryType,
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartstore_core::Reason;

    fn cmd(capacity: i64, count: i64) -> CreateInventory {
        CreateInventory {
            inventory_id: InventoryId::new("inv_u21"),
            location: InventoryLocation::new("store_123", "aisle_A1", "shelf_q1"),
            capacity,
            count,
            product_id: ProductId::new("prod10"),
            kind: InventoryType::Standard,
        }
    }

    #[test]
    fn withdraw_rejects_more_than_available() {
        let slot = Inventory::create(&cmd(10, 5)).unwrap();
        assert_eq!(slot.withdraw(3, Action::AddProduct).unwrap(), 2);

        let err = slot.withdraw(3, Action::AddProduct).unwrap_err();
        assert_eq!(
            err.kind(),
            &ErrorKind::InsufficientInventory {
                requested: 3,
                available: 2
            }
        );
        assert_eq!(slot.count(), 2);
    }

    #[test]
    fn restock_rejects_overflowing_capacity() {
        let slot = Inventory::create(&cmd(10, 8)).unwrap();
        let err = slot.restock(3, Action::RemoveProduct).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::CapacityExceeded { returned: 3, free: 2 });
        assert_eq!(err.action(), Action::RemoveProduct);
        assert_eq!(slot.restock(2, Action::RemoveProduct).unwrap(), 10);
    }

    #[test]
    fn restock_all_is_all_or_nothing() {
        let roomy = Inventory::create(&cmd(10, 2)).unwrap();
        let mut tight_cmd = cmd(10, 9);
        tight_cmd.inventory_id = InventoryId::new("inv_u22");
        let tight = Inventory::create(&tight_cmd).unwrap();

        let err = Inventory::restock_all(&[(&roomy, 3), (&tight, 2)], Action::ClearBasket).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::CapacityExceeded { returned: 2, free: 1 });
        assert_eq!(roomy.count(), 2);
        assert_eq!(tight.count(), 9);

        Inventory::restock_all(&[(&roomy, 3), (&tight, 1), (&roomy, 1)], Action::ClearBasket).unwrap();
        assert_eq!(roomy.count(), 6);
        assert_eq!(tight.count(), 10);
    }

    #[test]
    fn update_is_bounded_in_both_directions() {
        let slot = Inventory::create(&cmd(10, 5)).unwrap();
        assert_eq!(slot.update(5).unwrap(), 10);
        assert_eq!(slot.update(-10).unwrap(), 0);
        assert_eq!(slot.update(-1).unwrap_err().reason(), Reason::OutOfBounds);
        assert_eq!(slot.update(11).unwrap_err().reason(), Reason::OutOfBounds);
        assert_eq!(slot.count(), 0);
    }

    #[test]
    fn view_reflects_current_count() {
        let slot = Inventory::create(&cmd(10, 5)).unwrap();
        slot.update(-2).unwrap();
        let view = slot.view();
        assert_eq!(view.count, 3);
        assert_eq!(view.location.to_string(), "store_123:aisle_A1:shelf_q1");
    }

    #[test]
    fn concurrent_withdrawals_never_oversell() {
        let slot = std::sync::Arc::new(Inventory::create(&cmd(100, 100)).unwrap());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let slot = slot.clone();
                std::thread::spawn(move || {
                    (0..20)
                        .filter(|_| slot.withdraw(1, Action::AddProduct).is_ok())
                        .count()
                })
            })
            .collect();

        let taken: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(taken, 100);
        assert_eq!(slot.count(), 0);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: any count within 0..=capacity creates a slot.
            #[test]
            fn in_bounds_counts_are_accepted(
                (capacity, count) in (0i64..10_000).prop_flat_map(|c| (Just(c), 0..=c))
            ) {
                let slot = Inventory::create(&cmd(capacity, count)).unwrap();
                prop_assert_eq!(slot.count(), count);
            }

            /// Property: negative counts are rejected with OutOfBounds.
            #[test]
            fn negative_counts_are_rejected(capacity in 0i64..10_000, count in i64::MIN..0) {
                let err = Inventory::create(&cmd(capacity, count)).unwrap_err();
                prop_assert_eq!(err.reason(), Reason::OutOfBounds);
                prop_assert_eq!(err.action(), Action::AddInventory);
            }

            /// Property: counts above capacity are rejected with OutOfBounds.
            #[test]
            fn over_capacity_counts_are_rejected(capacity in 0i64..10_000, excess in 1i64..10_000) {
                let err = Inventory::create(&cmd(capacity, capacity + excess)).unwrap_err();
                prop_assert_eq!(err.reason(), Reason::OutOfBounds);
            }
        }
    }
}
