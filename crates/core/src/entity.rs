//! Entity trait: identity + continuity across state changes.

use crate::error::EntityKind;

/// Entity marker + minimal interface.
///
/// Every addressable thing in a store (aisles, shelves, baskets, ...) is an
/// entity. Two entities with the same id are the same entity, whatever their
/// current state.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    /// Kind reported in `NotFound` / `DuplicateEntity` failures.
    const KIND: EntityKind;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
