//! In-memory repositories.
//!
//! Each repository keeps serialized rows in a `BTreeMap` keyed by the
//! aggregate's UUID; v7 identifiers are time-ordered, so map order doubles as
//! creation order for listings. Narrow mutations (`delete`, `update_stock`,
//! `update_status`) patch the stored row directly, the way a single-statement
//! UPDATE would, instead of rehydrating the aggregate.

use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use storefront_audit::AuditLog;
use storefront_core::{AuditLogId, OrderId, Page, PageRequest, ProductId, UserId};
use storefront_orders::{Order, OrderStatus};
use storefront_products::Product;
use storefront_store::{StoreError, StoreKind, Transaction};
use storefront_users::User;

/// Capability check shared by all relational-flavored repositories.
fn check_tx(tx: Option<&Transaction>) -> Result<(), StoreError> {
    if let Some(tx) = tx {
        tx.expect_store(StoreKind::Relational)?;
    }
    Ok(())
}

type Rows = RwLock<BTreeMap<Uuid, JsonValue>>;

fn read_rows(rows: &Rows) -> Result<std::sync::RwLockReadGuard<'_, BTreeMap<Uuid, JsonValue>>, StoreError> {
    rows.read()
        .map_err(|_| StoreError::Backend("row lock poisoned".to_string()))
}

fn write_rows(rows: &Rows) -> Result<std::sync::RwLockWriteGuard<'_, BTreeMap<Uuid, JsonValue>>, StoreError> {
    rows.write()
        .map_err(|_| StoreError::Backend("row lock poisoned".to_string()))
}

fn to_row<T: Serialize>(value: &T) -> Result<JsonValue, StoreError> {
    Ok(serde_json::to_value(value)?)
}

fn is_live(row: &JsonValue) -> bool {
    row.get("deleted_at").is_none_or(JsonValue::is_null)
}

/// Patch `deleted_at` on a stored row; `Ok(false)` when absent or already gone.
fn soft_delete(rows: &Rows, id: Uuid) -> Result<bool, StoreError> {
    let mut rows = write_rows(rows)?;
    let Some(row) = rows.get_mut(&id) else {
        return Ok(false);
    };
    if !is_live(row) {
        return Ok(false);
    }
    let now = serde_json::to_value(Utc::now())?;
    row["deleted_at"] = now.clone();
    row["updated_at"] = now;
    Ok(true)
}

fn page_of<T: serde::de::DeserializeOwned>(
    rows: &Rows,
    page: PageRequest,
    filter: impl Fn(&JsonValue) -> bool,
) -> Result<Page<T>, StoreError> {
    let rows = read_rows(rows)?;
    let live: Vec<&JsonValue> = rows
        .values()
        .filter(|row| is_live(row) && filter(row))
        .collect();
    let total = live.len() as u64;

    let items = live
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .map(|row| serde_json::from_value(row.clone()).map_err(StoreError::from))
        .collect::<Result<Vec<T>, _>>()?;

    Ok(Page::new(items, total))
}

/// In-memory user rows.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    rows: Rows,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl storefront_store::UserRepository for InMemoryUserRepository {
    fn create(&self, tx: Option<&Transaction>, user: &User) -> Result<(), StoreError> {
        check_tx(tx)?;
        let mut rows = write_rows(&self.rows)?;
        let key = Uuid::from(user.id());
        if rows.contains_key(&key) {
            return Err(StoreError::Backend("duplicate user id".to_string()));
        }
        rows.insert(key, to_row(user)?);
        Ok(())
    }

    fn update(&self, tx: Option<&Transaction>, user: &User) -> Result<(), StoreError> {
        check_tx(tx)?;
        let mut rows = write_rows(&self.rows)?;
        let key = Uuid::from(user.id());
        if !rows.contains_key(&key) {
            return Err(StoreError::Backend("user row does not exist".to_string()));
        }
        rows.insert(key, to_row(user)?);
        Ok(())
    }

    fn delete(&self, tx: Option<&Transaction>, id: UserId) -> Result<(), StoreError> {
        check_tx(tx)?;
        soft_delete(&self.rows, Uuid::from(id))?;
        Ok(())
    }

    fn get_by_id(&self, tx: Option<&Transaction>, id: UserId) -> Result<Option<User>, StoreError> {
        check_tx(tx)?;
        let rows = read_rows(&self.rows)?;
        match rows.get(&Uuid::from(id)) {
            Some(row) if is_live(row) => Ok(Some(serde_json::from_value(row.clone())?)),
            _ => Ok(None),
        }
    }

    fn get_by_email(
        &self,
        tx: Option<&Transaction>,
        email: &str,
    ) -> Result<Option<User>, StoreError> {
        check_tx(tx)?;
        let rows = read_rows(&self.rows)?;
        for row in rows.values() {
            if is_live(row) && row.get("email").and_then(JsonValue::as_str) == Some(email) {
                return Ok(Some(serde_json::from_value(row.clone())?));
            }
        }
        Ok(None)
    }

    fn list(&self, tx: Option<&Transaction>, page: PageRequest) -> Result<Page<User>, StoreError> {
        check_tx(tx)?;
        page_of(&self.rows, page, |_| true)
    }
}

/// In-memory product rows.
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    rows: Rows,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl storefront_store::ProductRepository for InMemoryProductRepository {
    fn create(&self, tx: Option<&Transaction>, product: &Product) -> Result<(), StoreError> {
        check_tx(tx)?;
        let mut rows = write_rows(&self.rows)?;
        let key = Uuid::from(product.id());
        if rows.contains_key(&key) {
            return Err(StoreError::Backend("duplicate product id".to_string()));
        }
        rows.insert(key, to_row(product)?);
        Ok(())
    }

    fn update(&self, tx: Option<&Transaction>, product: &Product) -> Result<(), StoreError> {
        check_tx(tx)?;
        let mut rows = write_rows(&self.rows)?;
        let key = Uuid::from(product.id());
        if !rows.contains_key(&key) {
            return Err(StoreError::Backend(
                "product row does not exist".to_string(),
            ));
        }
        rows.insert(key, to_row(product)?);
        Ok(())
    }

    fn delete(&self, tx: Option<&Transaction>, id: ProductId) -> Result<(), StoreError> {
        check_tx(tx)?;
        soft_delete(&self.rows, Uuid::from(id))?;
        Ok(())
    }

    fn get_by_id(
        &self,
        tx: Option<&Transaction>,
        id: ProductId,
    ) -> Result<Option<Product>, StoreError> {
        check_tx(tx)?;
        let rows = read_rows(&self.rows)?;
        match rows.get(&Uuid::from(id)) {
            Some(row) if is_live(row) => Ok(Some(serde_json::from_value(row.clone())?)),
            _ => Ok(None),
        }
    }

    fn get_by_name(
        &self,
        tx: Option<&Transaction>,
        name: &str,
    ) -> Result<Option<Product>, StoreError> {
        check_tx(tx)?;
        let rows = read_rows(&self.rows)?;
        for row in rows.values() {
            if is_live(row) && row.get("name").and_then(JsonValue::as_str) == Some(name) {
                return Ok(Some(serde_json::from_value(row.clone())?));
            }
        }
        Ok(None)
    }

    fn list(
        &self,
        tx: Option<&Transaction>,
        page: PageRequest,
    ) -> Result<Page<Product>, StoreError> {
        check_tx(tx)?;
        page_of(&self.rows, page, |_| true)
    }

    fn update_stock(
        &self,
        tx: Option<&Transaction>,
        id: ProductId,
        delta: i64,
    ) -> Result<(), StoreError> {
        check_tx(tx)?;
        let mut rows = write_rows(&self.rows)?;
        let row = rows
            .get_mut(&Uuid::from(id))
            .filter(|row| is_live(row))
            .ok_or_else(|| StoreError::Backend("product row does not exist".to_string()))?;

        let current = row
            .get("stock")
            .and_then(JsonValue::as_i64)
            .ok_or_else(|| StoreError::Backend("product row has no stock column".to_string()))?;
        let next = current
            .checked_add(delta)
            .ok_or_else(|| StoreError::Backend("stock delta overflows".to_string()))?;
        // Mirrors a CHECK (stock >= 0) constraint.
        if next < 0 {
            return Err(StoreError::Backend(
                "stock check constraint violated".to_string(),
            ));
        }

        row["stock"] = JsonValue::from(next);
        row["updated_at"] = serde_json::to_value(Utc::now())?;
        Ok(())
    }
}

/// In-memory order rows (order header and items stored together).
#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    rows: Rows,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl storefront_store::OrderRepository for InMemoryOrderRepository {
    fn create(&self, tx: Option<&Transaction>, order: &Order) -> Result<(), StoreError> {
        check_tx(tx)?;
        let mut rows = write_rows(&self.rows)?;
        let key = Uuid::from(order.id());
        if rows.contains_key(&key) {
            return Err(StoreError::Backend("duplicate order id".to_string()));
        }
        rows.insert(key, to_row(order)?);
        Ok(())
    }

    fn update(&self, tx: Option<&Transaction>, order: &Order) -> Result<(), StoreError> {
        check_tx(tx)?;
        let mut rows = write_rows(&self.rows)?;
        let key = Uuid::from(order.id());
        if !rows.contains_key(&key) {
            return Err(StoreError::Backend("order row does not exist".to_string()));
        }
        rows.insert(key, to_row(order)?);
        Ok(())
    }

    fn delete(&self, tx: Option<&Transaction>, id: OrderId) -> Result<(), StoreError> {
        check_tx(tx)?;
        soft_delete(&self.rows, Uuid::from(id))?;
        Ok(())
    }

    fn get_by_id(
        &self,
        tx: Option<&Transaction>,
        id: OrderId,
    ) -> Result<Option<Order>, StoreError> {
        check_tx(tx)?;
        let rows = read_rows(&self.rows)?;
        match rows.get(&Uuid::from(id)) {
            Some(row) if is_live(row) => Ok(Some(serde_json::from_value(row.clone())?)),
            _ => Ok(None),
        }
    }

    fn get_by_user_id(
        &self,
        tx: Option<&Transaction>,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<Page<Order>, StoreError> {
        check_tx(tx)?;
        let wanted = serde_json::to_value(user_id)?;
        page_of(&self.rows, page, move |row| {
            row.get("user_id") == Some(&wanted)
        })
    }

    fn list(
        &self,
        tx: Option<&Transaction>,
        page: PageRequest,
    ) -> Result<Page<Order>, StoreError> {
        check_tx(tx)?;
        page_of(&self.rows, page, |_| true)
    }

    fn update_status(
        &self,
        tx: Option<&Transaction>,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), StoreError> {
        check_tx(tx)?;
        let mut rows = write_rows(&self.rows)?;
        let row = rows
            .get_mut(&Uuid::from(id))
            .filter(|row| is_live(row))
            .ok_or_else(|| StoreError::Backend("order row does not exist".to_string()))?;

        row["status"] = serde_json::to_value(status)?;
        row["updated_at"] = serde_json::to_value(Utc::now())?;
        Ok(())
    }
}

/// In-memory audit trail, append-only.
#[derive(Debug, Default)]
pub struct InMemoryAuditRepository {
    records: RwLock<Vec<AuditLog>>,
}

impl InMemoryAuditRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl storefront_store::AuditRepository for InMemoryAuditRepository {
    fn create(&self, audit: &AuditLog) -> Result<(), StoreError> {
        self.records
            .write()
            .map_err(|_| StoreError::Backend("audit lock poisoned".to_string()))?
            .push(audit.clone());
        Ok(())
    }

    fn get_by_id(&self, id: AuditLogId) -> Result<Option<AuditLog>, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| StoreError::Backend("audit lock poisoned".to_string()))?;
        Ok(records.iter().find(|log| log.id == id).cloned())
    }

    fn find_by_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<Vec<AuditLog>, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| StoreError::Backend("audit lock poisoned".to_string()))?;
        // Insertion order is oldest-first already.
        Ok(records
            .iter()
            .filter(|log| log.entity_type == entity_type && log.entity_id == entity_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_store::{ProductRepository, UserRepository};

    fn page() -> PageRequest {
        PageRequest::clamped(0, 10, 10, 100)
    }

    #[test]
    fn soft_deleted_users_vanish_from_reads_but_keep_their_row() {
        let repo = InMemoryUserRepository::new();
        let user = User::new("a@example.com", "Ada", "hash").unwrap();
        repo.create(None, &user).unwrap();

        repo.delete(None, user.id()).unwrap();

        assert!(repo.get_by_id(None, user.id()).unwrap().is_none());
        assert!(repo.get_by_email(None, "a@example.com").unwrap().is_none());
        assert_eq!(repo.list(None, page()).unwrap().total, 0);
        // The row survives physically.
        assert_eq!(repo.rows.read().unwrap().len(), 1);
    }

    #[test]
    fn update_stock_patches_the_row_in_place() {
        let repo = InMemoryProductRepository::new();
        let product = Product::new("Widget", "", 999, 5).unwrap();
        repo.create(None, &product).unwrap();

        repo.update_stock(None, product.id(), -3).unwrap();
        let reloaded = repo.get_by_id(None, product.id()).unwrap().unwrap();
        assert_eq!(reloaded.stock(), 2);

        let err = repo.update_stock(None, product.id(), -3).unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
        let reloaded = repo.get_by_id(None, product.id()).unwrap().unwrap();
        assert_eq!(reloaded.stock(), 2);

        let err = repo.update_stock(None, product.id(), i64::MAX).unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
        let reloaded = repo.get_by_id(None, product.id()).unwrap().unwrap();
        assert_eq!(reloaded.stock(), 2);
    }

    #[test]
    fn list_respects_the_requested_window() {
        let repo = InMemoryUserRepository::new();
        for i in 0..5 {
            let user = User::new(format!("u{i}@example.com"), "U", "hash").unwrap();
            repo.create(None, &user).unwrap();
        }

        let window = repo
            .list(None, PageRequest::clamped(1, 2, 10, 100))
            .unwrap();
        assert_eq!(window.total, 5);
        assert_eq!(window.items.len(), 2);
        // v7 ids are time-ordered, so map order is creation order.
        assert_eq!(window.items[0].email(), "u1@example.com");
    }
}
