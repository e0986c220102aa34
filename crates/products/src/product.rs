use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, Entity, ProductId};
use storefront_events::DomainEvent;

/// Aggregate root: Product.
///
/// Prices are carried in the smallest currency unit (cents). Stock mutation
/// is a signed delta applied atomically to the current value; the quantity is
/// never allowed to go negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    description: String,
    price_cents: i64,
    stock: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,

    #[serde(skip)]
    events: Vec<ProductEvent>,
}

impl Product {
    /// Validating factory. Fails fast, producing no partial object.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price_cents: i64,
        stock: i64,
    ) -> DomainResult<Self> {
        let now = Utc::now();
        let mut product = Self {
            id: ProductId::new(),
            name: name.into(),
            description: description.into(),
            price_cents,
            stock,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            events: Vec::new(),
        };

        product.validate()?;

        product.record(ProductEvent::Created {
            name: product.name.clone(),
            price_cents: product.price_cents,
            stock: product.stock,
        });

        Ok(product)
    }

    fn validate(&self) -> DomainResult<()> {
        if self.name.is_empty() {
            return Err(DomainError::validation("product name is required"));
        }
        if self.price_cents <= 0 {
            return Err(DomainError::validation(
                "product price must be greater than zero",
            ));
        }
        if self.stock < 0 {
            return Err(DomainError::validation("product stock cannot be negative"));
        }
        Ok(())
    }

    /// Update name, description and price.
    pub fn update(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        price_cents: i64,
    ) -> DomainResult<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(DomainError::validation("product name is required"));
        }
        if price_cents <= 0 {
            return Err(DomainError::validation(
                "product price must be greater than zero",
            ));
        }

        self.name = name.clone();
        self.description = description.into();
        self.price_cents = price_cents;
        self.updated_at = Utc::now();

        self.record(ProductEvent::Updated {
            id: self.id,
            name,
            price_cents,
        });
        Ok(())
    }

    /// Apply a signed stock delta.
    ///
    /// Leaves stock unchanged when the result would be negative.
    pub fn update_stock(&mut self, delta: i64) -> DomainResult<()> {
        let new_stock = self
            .stock
            .checked_add(delta)
            .ok_or_else(|| DomainError::validation(format!("stock delta {delta} overflows")))?;
        if new_stock < 0 {
            return Err(DomainError::insufficient_stock(format!(
                "stock {} cannot absorb delta {}",
                self.stock, delta
            )));
        }

        let old_stock = self.stock;
        self.stock = new_stock;
        self.updated_at = Utc::now();

        self.record(ProductEvent::StockUpdated {
            product_id: self.id,
            old_stock,
            new_stock,
            delta,
        });
        Ok(())
    }

    /// Reserve stock for an order (the negative-delta form of
    /// [`Product::update_stock`], named for intent).
    pub fn reserve_stock(&mut self, quantity: u32) -> DomainResult<()> {
        self.update_stock(-i64::from(quantity))
    }

    /// Soft delete.
    pub fn mark_deleted(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;

        self.record(ProductEvent::Deleted { id: self.id });
    }

    /// Return the pending events and clear the buffer.
    pub fn drain_events(&mut self) -> Vec<ProductEvent> {
        std::mem::take(&mut self.events)
    }

    fn record(&mut self, event: ProductEvent) {
        self.events.push(event);
    }

    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price_cents(&self) -> i64 {
        self.price_cents
    }

    pub fn stock(&self) -> i64 {
        self.stock
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Product domain events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProductEvent {
    Created {
        name: String,
        price_cents: i64,
        stock: i64,
    },
    Updated {
        id: ProductId,
        name: String,
        price_cents: i64,
    },
    StockUpdated {
        product_id: ProductId,
        old_stock: i64,
        new_stock: i64,
        delta: i64,
    },
    Deleted {
        id: ProductId,
    },
}

impl DomainEvent for ProductEvent {
    fn name(&self) -> &'static str {
        match self {
            ProductEvent::Created { .. } => "product.created",
            ProductEvent::Updated { .. } => "product.updated",
            ProductEvent::StockUpdated { .. } => "product.stock_updated",
            ProductEvent::Deleted { .. } => "product.deleted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> Product {
        Product::new("Widget", "A widget", 999, 5).unwrap()
    }

    #[test]
    fn new_product_keeps_given_price_and_stock() {
        let mut product = widget();
        assert_eq!(product.price_cents(), 999);
        assert_eq!(product.stock(), 5);

        let events = product.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name(), "product.created");
    }

    #[test]
    fn rejects_non_positive_price() {
        assert!(Product::new("Widget", "", 0, 5).is_err());
        assert!(Product::new("Widget", "", -100, 5).is_err());
    }

    #[test]
    fn rejects_negative_initial_stock() {
        let err = Product::new("Widget", "", 999, -1).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn update_stock_applies_signed_delta() {
        let mut product = widget();
        product.drain_events();

        product.update_stock(3).unwrap();
        assert_eq!(product.stock(), 8);
        product.update_stock(-8).unwrap();
        assert_eq!(product.stock(), 0);

        let events = product.drain_events();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.name() == "product.stock_updated"));
    }

    #[test]
    fn update_stock_below_zero_fails_and_leaves_stock_unchanged() {
        let mut product = widget();
        product.drain_events();

        let err = product.update_stock(-6).unwrap_err();
        assert!(matches!(err, DomainError::InsufficientStock(_)));
        assert_eq!(product.stock(), 5);
        assert!(product.drain_events().is_empty());
    }

    #[test]
    fn update_stock_rejects_overflowing_deltas() {
        let mut product = widget();
        product.drain_events();

        let err = product.update_stock(i64::MAX).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        // 5 + i64::MIN is representable, so this is a plain shortfall.
        let err = product.update_stock(i64::MIN).unwrap_err();
        assert!(matches!(err, DomainError::InsufficientStock(_)));

        assert_eq!(product.stock(), 5);
        assert!(product.drain_events().is_empty());
    }

    #[test]
    fn reserve_stock_is_a_negative_delta() {
        let mut product = widget();
        product.drain_events();

        product.reserve_stock(5).unwrap();
        assert_eq!(product.stock(), 0);

        let err = product.reserve_stock(1).unwrap_err();
        assert!(matches!(err, DomainError::InsufficientStock(_)));
    }

    #[test]
    fn update_validates_before_mutating() {
        let mut product = widget();
        product.drain_events();

        assert!(product.update("", "d", 100).is_err());
        assert!(product.update("W", "d", 0).is_err());
        assert_eq!(product.name(), "Widget");
        assert_eq!(product.price_cents(), 999);
        assert!(product.drain_events().is_empty());

        product.update("Gadget", "A gadget", 1299).unwrap();
        assert_eq!(product.name(), "Gadget");
        assert_eq!(product.price_cents(), 1299);
        assert_eq!(product.drain_events().len(), 1);
    }

    #[test]
    fn mark_deleted_records_deleted_event() {
        let mut product = widget();
        product.drain_events();

        product.mark_deleted();
        assert!(product.is_deleted());
        assert_eq!(product.drain_events()[0].name(), "product.deleted");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Stock never goes negative under an arbitrary delta sequence:
            /// each delta either applies in full or is rejected in full.
            #[test]
            fn stock_never_negative(
                initial in 0i64..10_000,
                deltas in proptest::collection::vec(-500i64..500, 0..50),
            ) {
                let mut product = Product::new("P", "", 1, initial).unwrap();
                let mut expected = initial;
                for delta in deltas {
                    match product.update_stock(delta) {
                        Ok(()) => expected += delta,
                        Err(DomainError::InsufficientStock(_)) => {
                            prop_assert!(expected + delta < 0);
                        }
                        Err(other) => prop_assert!(false, "unexpected error: {other}"),
                    }
                    prop_assert_eq!(product.stock(), expected);
                    prop_assert!(product.stock() >= 0);
                }
            }

            /// Accepted creations preserve price and stock exactly and emit
            /// exactly one created event.
            #[test]
            fn create_preserves_price_and_stock(
                price in 1i64..1_000_000,
                stock in 0i64..1_000_000,
            ) {
                let mut product = Product::new("P", "", price, stock).unwrap();
                prop_assert_eq!(product.price_cents(), price);
                prop_assert_eq!(product.stock(), stock);
                prop_assert_eq!(product.drain_events().len(), 1);
            }
        }
    }
}
