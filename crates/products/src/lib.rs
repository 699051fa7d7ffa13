//! Product catalog module.
//!
//! Products are immutable catalog entries. Their temperature class decides
//! which shelves may stock them.

pub mod product;

pub use product::{CreateProduct, Product, ProductView, Temperature, parse_price_cents};
