//! Reference adapters behind the store contracts.
//!
//! The in-memory adapters back tests, benchmarks and local development; the
//! optional `redis` feature adds a real key-value cache. Relational and
//! document backends plug in behind the same repository traits.

pub mod consumer;
pub mod memory;

#[cfg(feature = "redis")]
pub mod redis_cache;


pub use consumer::AuditConsumer;
pub use memory::{
    InMemoryAuditRepository, InMemoryCache, InMemoryMessageProducer, InMemoryOrderRepository,
    InMemoryProductRepository, InMemoryTransactionFactory, InMemoryUserRepository,
};

#[cfg(feature = "redis")]
pub use redis_cache::RedisCache;
