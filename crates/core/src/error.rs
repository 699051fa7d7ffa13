//! Store error model.
//!
//! Every store operation either succeeds or fails with a [`StoreError`]: the
//! operation that failed ([`Action`]) plus the condition that stopped it
//! ([`ErrorKind`]). Each condition maps onto a small closed set of
//! [`Reason`] codes so callers (API layer, command interpreter, tests) can
//! branch on the category without matching on text.

use serde::Serialize;
use thiserror::Error;

/// Result type used across the store model.
pub type StoreResult<T> = Result<T, StoreError>;

/// Closed set of failure categories.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    NotFound,
    DuplicateEntity,
    OutOfBounds,
    LocationMismatch,
    AmbiguousMatch,
    InvalidState,
    /// The in-memory mutation committed but the persistence sink rejected it.
    Persistence,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::NotFound => "not_found",
            Reason::DuplicateEntity => "duplicate_entity",
            Reason::OutOfBounds => "out_of_bounds",
            Reason::LocationMismatch => "location_mismatch",
            Reason::AmbiguousMatch => "ambiguous_match",
            Reason::InvalidState => "invalid_state",
            Reason::Persistence => "persistence",
        }
    }
}

impl core::fmt::Display for Reason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kinds of entity held by the store model.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Store,
    Aisle,
    Shelf,
    Inventory,
    Product,
    Customer,
    Basket,
    Device,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Store => "store",
            EntityKind::Aisle => "aisle",
            EntityKind::Shelf => "shelf",
            EntityKind::Inventory => "inventory",
            EntityKind::Product => "product",
            EntityKind::Customer => "customer",
            EntityKind::Basket => "basket",
            EntityKind::Device => "device",
        }
    }
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The operation a failure happened in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    ProvisionStore,
    ShowStore,
    UpdateStore,
    DeleteStore,
    AddAisle,
    GetAisle,
    ProvisionAisle,
    ShowAisle,
    AddShelf,
    GetShelf,
    ProvisionShelf,
    ShowShelf,
    AddInventory,
    ProvisionInventory,
    ShowInventory,
    UpdateInventory,
    ProvisionProduct,
    ShowProduct,
    ProvisionCustomer,
    UpdateCustomer,
    ShowCustomer,
    ProvisionBasket,
    AssignBasket,
    GetCustomerBasket,
    AddProduct,
    RemoveProduct,
    ClearBasket,
    ShowBasket,
    AddDevice,
    ProvisionDevice,
    ShowDevice,
    RaiseEvent,
    IssueCommand,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ProvisionStore => "Provision Store",
            Action::ShowStore => "Show Store",
            Action::UpdateStore => "Update Store",
            Action::DeleteStore => "Delete Store",
            Action::AddAisle => "Add Aisle",
            Action::GetAisle => "Get Aisle",
            Action::ProvisionAisle => "Provision Aisle",
            Action::ShowAisle => "Show Aisle",
            Action::AddShelf => "Add Shelf",
            Action::GetShelf => "Get Shelf",
            Action::ProvisionShelf => "Provision Shelf",
            Action::ShowShelf => "Show Shelf",
            Action::AddInventory => "Add Inventory",
            Action::ProvisionInventory => "Provision Inventory",
            Action::ShowInventory => "Show Inventory",
            Action::UpdateInventory => "Update Inventory",
            Action::ProvisionProduct => "Provision Product",
            Action::ShowProduct => "Show Product",
            Action::ProvisionCustomer => "Provision Customer",
            Action::UpdateCustomer => "Update Customer",
            Action::ShowCustomer => "Show Customer",
            Action::ProvisionBasket => "Provision Basket",
            Action::AssignBasket => "Assign Basket",
            Action::GetCustomerBasket => "Get Customer Basket",
            Action::AddProduct => "Add Product",
            Action::RemoveProduct => "Remove Product",
            Action::ClearBasket => "Clear Basket",
            Action::ShowBasket => "Show Basket",
            Action::AddDevice => "Add Device",
            Action::ProvisionDevice => "Provision Device",
            Action::ShowDevice => "Show Device",
            Action::RaiseEvent => "Raise Event",
            Action::IssueCommand => "Issue Command",
        }
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Specific failure condition.
///
/// Keep this focused on deterministic store-model failures. Anything the
/// persistence sink reports is folded into [`ErrorKind::Persistence`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("store does not exist")]
    StoreNotFound,
    #[error("aisle does not exist")]
    AisleNotFound,
    #[error("shelf does not exist")]
    ShelfNotFound,
    #[error("inventory does not exist")]
    InventoryNotFound,
    #[error("product does not exist")]
    ProductNotFound,
    #[error("customer does not exist")]
    CustomerNotFound,
    #[error("basket does not exist")]
    BasketNotFound,
    #[error("device does not exist")]
    DeviceNotFound,
    #[error("customer does not have a basket")]
    CustomerHasNoBasket,
    #[error("product is not in the basket")]
    ProductNotInBasket,

    #[error("{0} already exists")]
    DuplicateEntity(EntityKind),
    #[error("a shelf already exists at this level")]
    ShelfLevelOccupied,

    #[error("count {count} is outside 0..={capacity}")]
    OutOfBounds { count: i64, capacity: i64 },
    #[error("quantity must be positive (got {0})")]
    InvalidQuantity(i64),
    #[error("not enough inventory on the shelf (requested {requested}, available {available})")]
    InsufficientInventory { requested: i64, available: i64 },
    #[error("trying to remove {requested} but the basket holds {held}")]
    RemoveExceedsHeld { requested: i64, held: i64 },
    #[error("not enough capacity on the shelf (returning {returned}, free {free})")]
    CapacityExceeded { returned: i64, free: i64 },

    #[error("customer is not near the product")]
    ProductNotNearCustomer,
    #[error("product and shelf temperature are not consistent")]
    TemperatureMismatch,
    #[error("customer has no store location")]
    CustomerNotLocated,

    #[error("product occupies {0} slots in the aisle")]
    AmbiguousProduct(usize),

    #[error("guests are not allowed to shop")]
    GuestNotAllowed,
    #[error("basket has not been assigned to a customer")]
    BasketNotAssigned,
    #[error("basket is assigned to another customer")]
    BasketAlreadyAssigned,
    #[error("customer already holds a basket")]
    CustomerHasBasket,
    #[error("device is not an appliance")]
    NotAnAppliance,
    #[error("unknown device type '{0}'")]
    UnknownDeviceType(String),

    #[error("persistence failed: {0}")]
    Persistence(String),
}

impl ErrorKind {
    /// Category of this condition.
    pub fn reason(&self) -> Reason {
        match self {
            ErrorKind::StoreNotFound
            | ErrorKind::AisleNotFound
            | ErrorKind::ShelfNotFound
            | ErrorKind::InventoryNotFound
            | ErrorKind::ProductNotFound
            | ErrorKind::CustomerNotFound
            | ErrorKind::BasketNotFound
            | ErrorKind::DeviceNotFound
            | ErrorKind::CustomerHasNoBasket
            | ErrorKind::ProductNotInBasket => Reason::NotFound,

            ErrorKind::DuplicateEntity(_) | ErrorKind::ShelfLevelOccupied => Reason::DuplicateEntity,

            ErrorKind::OutOfBounds { .. }
            | ErrorKind::InvalidQuantity(_)
            | ErrorKind::InsufficientInventory { .. }
            | ErrorKind::RemoveExceedsHeld { .. }
            | ErrorKind::CapacityExceeded { .. } => Reason::OutOfBounds,

            ErrorKind::ProductNotNearCustomer
            | ErrorKind::TemperatureMismatch
            | ErrorKind::CustomerNotLocated => Reason::LocationMismatch,

            ErrorKind::AmbiguousProduct(_) => Reason::AmbiguousMatch,

            ErrorKind::GuestNotAllowed
            | ErrorKind::BasketNotAssigned
            | ErrorKind::BasketAlreadyAssigned
            | ErrorKind::CustomerHasBasket
            | ErrorKind::NotAnAppliance
            | ErrorKind::UnknownDeviceType(_) => Reason::InvalidState,

            ErrorKind::Persistence(_) => Reason::Persistence,
        }
    }

    /// `NotFound` condition for an entity kind.
    pub fn not_found(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Store => ErrorKind::StoreNotFound,
            EntityKind::Aisle => ErrorKind::AisleNotFound,
            EntityKind::Shelf => ErrorKind::ShelfNotFound,
            EntityKind::Inventory => ErrorKind::InventoryNotFound,
            EntityKind::Product => ErrorKind::ProductNotFound,
            EntityKind::Customer => ErrorKind::CustomerNotFound,
            EntityKind::Basket => ErrorKind::BasketNotFound,
            EntityKind::Device => ErrorKind::DeviceNotFound,
        }
    }
}

/// A failed store operation: `(action, reason)`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{action}: {kind}")]
pub struct StoreError {
    action: Action,
    kind: ErrorKind,
}

impl StoreError {
    pub fn new(action: Action, kind: ErrorKind) -> Self {
        Self { action, kind }
    }

    pub fn not_found(action: Action, entity: EntityKind) -> Self {
        Self::new(action, ErrorKind::not_found(entity))
    }

    pub fn duplicate(action: Action, entity: EntityKind) -> Self {
        Self::new(action, ErrorKind::DuplicateEntity(entity))
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn reason(&self) -> Reason {
        self.kind.reason()
    }
}

/// Failure parsing textual input (identifiers, locations, enum names).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("{0} cannot be empty")]
    EmptyId(&'static str),

    #[error("malformed location '{0}' (expected {1})")]
    MalformedLocation(String, &'static str),

    #[error("unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("invalid {kind} '{value}'")]
    InvalidNumber { kind: &'static str, value: String },
}

impl ParseError {
    pub fn unknown(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownVariant {
            kind,
            value: value.into(),
        }
    }
}
