//! Store customers: identity, current location and basket association.

pub mod customer;

pub use customer::{CreateCustomer, Customer, CustomerType, CustomerView};
