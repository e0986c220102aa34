//! In-memory adapters for every store contract.
//!
//! Intended for tests and local development. Not optimized for performance.

pub mod cache;
pub mod producer;
pub mod repos;
pub mod transaction;

pub use cache::InMemoryCache;
pub use producer::{InMemoryMessageProducer, SentMessage};
pub use repos::{
    InMemoryAuditRepository, InMemoryOrderRepository, InMemoryProductRepository,
    InMemoryUserRepository,
};
pub use transaction::InMemoryTransactionFactory;
