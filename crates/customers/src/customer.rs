use chrono::{DateTime, Utc};
use core::str::FromStr;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use smartstore_core::{
    Action, BasketId, CustomerId, Entity, EntityKind, ErrorKind, ParseError, StoreError,
    StoreLocation, StoreResult,
};

/// Guests may walk the store but not shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerType {
    Guest,
    Registered,
}

impl CustomerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerType::Guest => "guest",
            CustomerType::Registered => "registered",
        }
    }
}

impl core::fmt::Display for CustomerType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CustomerType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "guest" => Ok(CustomerType::Guest),
            "registered" => Ok(CustomerType::Registered),
            _ => Err(ParseError::unknown("customer type", s)),
        }
    }
}

/// Command: CreateCustomer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCustomer {
    pub customer_id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub kind: CustomerType,
    pub email: String,
    pub account_address: String,
}

#[derive(Debug, Clone, Default)]
struct CustomerState {
    location: Option<StoreLocation>,
    last_seen: Option<DateTime<Utc>>,
    basket_id: Option<BasketId>,
}

#[derive(Debug)]
pub struct Customer {
    id: CustomerId,
    first_name: String,
    last_name: String,
    kind: CustomerType,
    email: String,
    account_address: String,
    state: RwLock<CustomerState>,
}

impl Customer {
    pub fn create(cmd: CreateCustomer) -> Self {
        Self {
            id: cmd.customer_id,
            first_name: cmd.first_name,
            last_name: cmd.last_name,
            kind: cmd.kind,
            email: cmd.email,
            account_address: cmd.account_address,
            state: RwLock::new(CustomerState::default()),
        }
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn kind(&self) -> CustomerType {
        self.kind
    }

    pub fn is_guest(&self) -> bool {
        self.kind == CustomerType::Guest
    }

    pub fn location(&self) -> Option<StoreLocation> {
        self.state.read().location.clone()
    }

    pub fn last_seen(&self) -> Option<DateTime<Utc>> {
        self.state.read().last_seen
    }

    pub fn basket_id(&self) -> Option<BasketId> {
        self.state.read().basket_id.clone()
    }

    /// Move the customer. `seen_at` of `None` clears the last-seen stamp.
    pub fn relocate(&self, location: StoreLocation, seen_at: Option<DateTime<Utc>>) {
        let mut state = self.state.write();
        state.location = Some(location);
        state.last_seen = seen_at;
    }

    /// Link a basket to this customer. Re-attaching the same basket is a no-op.
    pub fn attach_basket(&self, basket_id: &BasketId) -> StoreResult<()> {
        let mut state = self.state.write();
        match &state.basket_id {
            Some(held) if held != basket_id => Err(StoreError::new(
                Action::AssignBasket,
                ErrorKind::CustomerHasBasket,
            )),
            _ => {
                state.basket_id = Some(basket_id.clone());
                Ok(())
            }
        }
    }

    /// Unlink the held basket, returning its id.
    pub fn detach_basket(&self) -> Option<BasketId> {
        self.state.write().basket_id.take()
    }

    pub fn view(&self) -> CustomerView {
        let state = self.state.read();
        CustomerView {
            id: self.id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            kind: self.kind,
            email: self.email.clone(),
            account_address: self.account_address.clone(),
            location: state.location.clone(),
            last_seen: state.last_seen,
            basket_id: state.basket_id.clone(),
        }
    }
}

impl Entity for Customer {
    type Id = CustomerId;
    const KIND: EntityKind = EntityKind::Customer;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Serializable projection of a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerView {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub kind: CustomerType,
    pub email: String,
    pub account_address: String,
    pub location: Option<StoreLocation>,
    pub last_seen: Option<DateTime<Utc>>,
    pub basket_id: Option<BasketId>,
}
