//! Repository contracts, one per aggregate.
//!
//! Every method accepts an optional [`Transaction`]; `None` means "no
//! explicit transaction, use the default connection" with auto-committing
//! single-statement semantics. Implementations must capability-check any
//! transaction they receive (see [`Transaction::expect_store`]).
//!
//! Reads (`get_by_*`, `list`) exclude soft-deleted records.

use storefront_audit::AuditLog;
use storefront_core::{AuditLogId, OrderId, Page, PageRequest, ProductId, UserId};
use storefront_orders::{Order, OrderStatus};
use storefront_products::Product;
use storefront_users::User;

use crate::error::StoreError;
use crate::transaction::Transaction;

/// Persistence operations for the User aggregate.
pub trait UserRepository: Send + Sync {
    fn create(&self, tx: Option<&Transaction>, user: &User) -> Result<(), StoreError>;

    fn update(&self, tx: Option<&Transaction>, user: &User) -> Result<(), StoreError>;

    /// Soft-deletes; the record is marked, never physically removed.
    fn delete(&self, tx: Option<&Transaction>, id: UserId) -> Result<(), StoreError>;

    fn get_by_id(&self, tx: Option<&Transaction>, id: UserId) -> Result<Option<User>, StoreError>;

    fn get_by_email(
        &self,
        tx: Option<&Transaction>,
        email: &str,
    ) -> Result<Option<User>, StoreError>;

    fn list(&self, tx: Option<&Transaction>, page: PageRequest) -> Result<Page<User>, StoreError>;
}

/// Persistence operations for the Product aggregate.
pub trait ProductRepository: Send + Sync {
    fn create(&self, tx: Option<&Transaction>, product: &Product) -> Result<(), StoreError>;

    fn update(&self, tx: Option<&Transaction>, product: &Product) -> Result<(), StoreError>;

    fn delete(&self, tx: Option<&Transaction>, id: ProductId) -> Result<(), StoreError>;

    fn get_by_id(
        &self,
        tx: Option<&Transaction>,
        id: ProductId,
    ) -> Result<Option<Product>, StoreError>;

    fn get_by_name(
        &self,
        tx: Option<&Transaction>,
        name: &str,
    ) -> Result<Option<Product>, StoreError>;

    fn list(
        &self,
        tx: Option<&Transaction>,
        page: PageRequest,
    ) -> Result<Page<Product>, StoreError>;

    /// Narrow, intention-revealing stock mutation: apply a signed delta to
    /// the current value in a single statement.
    fn update_stock(
        &self,
        tx: Option<&Transaction>,
        id: ProductId,
        delta: i64,
    ) -> Result<(), StoreError>;
}

/// Persistence operations for the Order aggregate (order plus items).
pub trait OrderRepository: Send + Sync {
    fn create(&self, tx: Option<&Transaction>, order: &Order) -> Result<(), StoreError>;

    fn update(&self, tx: Option<&Transaction>, order: &Order) -> Result<(), StoreError>;

    fn delete(&self, tx: Option<&Transaction>, id: OrderId) -> Result<(), StoreError>;

    fn get_by_id(
        &self,
        tx: Option<&Transaction>,
        id: OrderId,
    ) -> Result<Option<Order>, StoreError>;

    fn get_by_user_id(
        &self,
        tx: Option<&Transaction>,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<Page<Order>, StoreError>;

    fn list(&self, tx: Option<&Transaction>, page: PageRequest)
    -> Result<Page<Order>, StoreError>;

    /// Narrow, intention-revealing status mutation.
    fn update_status(
        &self,
        tx: Option<&Transaction>,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), StoreError>;
}

/// Persistence operations for audit log records (append-only).
pub trait AuditRepository: Send + Sync {
    fn create(&self, audit: &AuditLog) -> Result<(), StoreError>;

    fn get_by_id(&self, id: AuditLogId) -> Result<Option<AuditLog>, StoreError>;

    fn find_by_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<Vec<AuditLog>, StoreError>;
}
