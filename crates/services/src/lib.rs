//! The transactional domain-service layer.
//!
//! One service per aggregate orchestrates: load aggregate → validate/mutate →
//! persist via repository + transaction → drain and publish recorded events.
//! Read-heavy services can be wrapped by a cache-aside decorator implementing
//! the identical trait, so either variant substitutes at the same call sites.

pub mod audit_service;
pub mod cached_product_service;
pub mod cached_user_service;
pub mod config;
pub mod error;
pub mod order_service;
pub mod product_service;
pub mod user_service;

mod publish;

pub use audit_service::AuditService;
pub use cached_product_service::CachedProductService;
pub use cached_user_service::CachedUserService;
pub use config::ServiceConfig;
pub use error::ServiceError;
pub use order_service::{DomainOrderService, OrderService};
pub use product_service::{DomainProductService, ProductService};
pub use user_service::{DomainUserService, UserService};
