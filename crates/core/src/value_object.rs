//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have **no identity**: they are defined entirely by their
/// attribute values and never change once built. Locations are the main value
/// objects of the store model; a customer "moving" gets a new `StoreLocation`
/// rather than a mutated one.
///
/// ```ignore
/// let a = StoreLocation::new("store_1", "aisle_A");
/// let b = StoreLocation::new("store_1", "aisle_A");
/// assert_eq!(a, b);
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
