//! The User aggregate.

pub mod user;

pub use user::{User, UserEvent};
