use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use smartstore_core::{Action, Entity, StoreError, StoreResult};

/// Concurrent id → entity map with atomic insert-if-absent.
#[derive(Debug)]
pub struct Registry<T: Entity> {
    entries: DashMap<T::Id, Arc<T>>,
}

impl<T: Entity> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<T: Entity> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entity, failing `NotFound` for its kind under `action`.
    pub fn get(&self, id: &T::Id, action: Action) -> StoreResult<Arc<T>> {
        self.find(id)
            .ok_or_else(|| StoreError::not_found(action, T::KIND))
    }

    pub fn find(&self, id: &T::Id) -> Option<Arc<T>> {
        self.entries.get(id).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.entries.contains_key(id)
    }

    /// Register `value` unless its id is taken.
    pub fn insert_new(&self, value: T, action: Action) -> StoreResult<Arc<T>> {
        let id = value.id().clone();
        self.try_insert_with(id, action, || Ok(Arc::new(value)))
    }

    /// Reserve `id` and register whatever `build` produces.
    ///
    /// The id's shard stays locked while `build` runs, so two callers racing
    /// on the same id cannot both build. `build` must not touch this registry.
    pub fn try_insert_with<F>(&self, id: T::Id, action: Action, build: F) -> StoreResult<Arc<T>>
    where
        F: FnOnce() -> StoreResult<Arc<T>>,
    {
        match self.entries.entry(id) {
            Entry::Occupied(_) => Err(StoreError::duplicate(action, T::KIND)),
            Entry::Vacant(slot) => {
                let value = build()?;
                slot.insert(value.clone());
                Ok(value)
            }
        }
    }

    pub fn remove(&self, id: &T::Id) -> Option<Arc<T>> {
        self.entries.remove(id).map(|(_, value)| value)
    }

    pub fn values(&self) -> Vec<Arc<T>> {
        self.entries.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartstore_core::{BasketId, EntityKind, ErrorKind, Reason};
    use smartstore_baskets::Basket;

    #[test]
    fn duplicate_ids_are_rejected() {
        let registry = Registry::<Basket>::new();
        registry
            .insert_new(Basket::create(BasketId::new("b1")), Action::ProvisionBasket)
            .unwrap();

        let err = registry
            .insert_new(Basket::create(BasketId::new("b1")), Action::ProvisionBasket)
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::DuplicateEntity(EntityKind::Basket));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn failed_build_leaves_the_id_free() {
        let registry = Registry::<Basket>::new();
        let err = registry
            .try_insert_with(BasketId::new("b1"), Action::ProvisionBasket, || {
                Err(StoreError::new(Action::ProvisionBasket, ErrorKind::StoreNotFound))
            })
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::StoreNotFound);
        assert!(!registry.contains(&BasketId::new("b1")));
    }

    #[test]
    fn get_reports_not_found_for_the_entity_kind() {
        let registry = Registry::<Basket>::new();
        let err = registry
            .get(&BasketId::new("missing"), Action::ShowBasket)
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::BasketNotFound);
        assert_eq!(err.reason(), Reason::NotFound);
        assert_eq!(err.action(), Action::ShowBasket);
    }

    #[test]
    fn concurrent_inserts_register_exactly_once() {
        let registry = Arc::new(Registry::<Basket>::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    registry
                        .insert_new(Basket::create(BasketId::new("shared")), Action::ProvisionBasket)
                        .is_ok()
                })
            })
            .collect();

        let wins = handles
            .into_iter()
            .filter_map(|h| h.join().ok())
            .filter(|won| *won)
            .count();
        assert_eq!(wins, 1);
    }
}
