//! Domain Module
//!
//! Entities and repository contracts for the three business areas:
//! - Catalog (products)
//! - Sellers (shops a catalog can be browsed in)
//! - Checkout (shopping carts)

pub mod catalog;
pub mod checkout;
pub mod sellers;

pub use catalog::{Product, ProductRepository};
pub use checkout::{Cart, CartItem, CartRepository};
pub use sellers::{Seller, SellerProvider, SellerRepository};
