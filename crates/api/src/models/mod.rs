//! Domain models for the API.
//!
//! Row types double as response bodies where the shapes match; the user
//! model never carries the password hash.

pub mod cart;
pub mod product;
pub mod user;

pub use cart::CartItem;
pub use product::{NewProduct, Product, ProductFilter, ProductUpdate, ProductValidationError};
pub use user::User;
