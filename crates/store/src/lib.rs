//! Store-agnostic persistence contracts.
//!
//! Repositories, the capability-checked transaction handle and the cache
//! contract all live here; concrete backends (relational, document,
//! key-value) plug in behind these seams.

pub mod cache;
pub mod error;
pub mod repo;
pub mod transaction;

pub use cache::Cache;
pub use error::StoreError;
pub use repo::{AuditRepository, OrderRepository, ProductRepository, UserRepository};
pub use transaction::{StoreKind, Transaction, TransactionFactory, TransactionHandle};
