//! The Product aggregate.

pub mod product;

pub use product::{Product, ProductEvent};
