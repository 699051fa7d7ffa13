//! Strongly-typed identifiers used across the store model.
//!
//! Identifiers are caller-chosen strings (`store_123`, `aisle_A1`, `prod10`)
//! rather than generated values: scripts and API callers address entities by
//! the names they provisioned them with.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

macro_rules! impl_string_id {
    ($(#[$meta:meta])* $t:ident, $name:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(String);

        impl $t {
            /// Wrap a raw identifier. Use `parse` for untrusted input.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $t {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $t {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl core::borrow::Borrow<str> for $t {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $t {
            type Err = ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(ParseError::EmptyId($name));
                }
                Ok(Self(trimmed.to_string()))
            }
        }
    };
}

impl_string_id!(
    /// Identifier of a store.
    StoreId,
    "StoreId"
);
impl_string_id!(
    /// Aisle number, unique within its store.
    AisleId,
    "AisleId"
);
impl_string_id!(
    /// Identifier of a shelf, unique within its aisle.
    ShelfId,
    "ShelfId"
);
impl_string_id!(
    /// Identifier of an inventory slot.
    InventoryId,
    "InventoryId"
);
impl_string_id!(
    /// Catalog product identifier.
    ProductId,
    "ProductId"
);
impl_string_id!(
    /// Identifier of a customer.
    CustomerId,
    "CustomerId"
);
impl_string_id!(
    /// Identifier of a basket.
    BasketId,
    "BasketId"
);
impl_string_id!(
    /// Identifier of a device (sensor or appliance).
    DeviceId,
    "DeviceId"
);
