//! Shopping baskets.
//!
//! A basket moves units between shelves and a customer. Every movement is
//! scoped to the aisle the customer currently stands in, and runs under the
//! basket's own lock so two shoppers never interleave on one basket.

pub mod basket;

pub use basket::{Basket, BasketItem, BasketView};
