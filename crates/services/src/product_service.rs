//! Product domain service.

use std::sync::Arc;

use storefront_core::{DomainError, Page, PageRequest, ProductId};
use storefront_events::{EventBus, NoopEventBus};
use storefront_products::Product;
use storefront_store::ProductRepository;

use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::publish;

/// Operations exposed for the Product aggregate.
pub trait ProductService: Send + Sync {
    fn create(
        &self,
        name: &str,
        description: &str,
        price_cents: i64,
        stock: i64,
    ) -> Result<Product, ServiceError>;

    fn update(
        &self,
        id: ProductId,
        name: &str,
        description: &str,
        price_cents: i64,
    ) -> Result<Product, ServiceError>;

    fn delete(&self, id: ProductId) -> Result<(), ServiceError>;

    fn get(&self, id: ProductId) -> Result<Option<Product>, ServiceError>;

    fn get_by_name(&self, name: &str) -> Result<Option<Product>, ServiceError>;

    fn list(&self, offset: i64, limit: i64) -> Result<Page<Product>, ServiceError>;

    /// Apply a signed stock delta. The aggregate rejects any delta that
    /// would drive stock negative before anything is persisted.
    fn update_stock(&self, id: ProductId, delta: i64) -> Result<(), ServiceError>;
}

/// Base implementation backed by a [`ProductRepository`].
pub struct DomainProductService {
    repo: Arc<dyn ProductRepository>,
    bus: Arc<dyn EventBus>,
    config: ServiceConfig,
}

impl DomainProductService {
    pub fn new(
        repo: Arc<dyn ProductRepository>,
        bus: Option<Arc<dyn EventBus>>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            repo,
            bus: bus.unwrap_or_else(|| Arc::new(NoopEventBus::new())),
            config,
        }
    }

    fn publish_events(&self, product: &mut Product) {
        publish::publish_all(
            self.bus.as_ref(),
            &product.id().to_string(),
            product.drain_events(),
        );
    }
}

impl ProductService for DomainProductService {
    #[tracing::instrument(skip_all, fields(product.name = %name))]
    fn create(
        &self,
        name: &str,
        description: &str,
        price_cents: i64,
        stock: i64,
    ) -> Result<Product, ServiceError> {
        if self.repo.get_by_name(None, name)?.is_some() {
            return Err(DomainError::conflict("product name is already taken").into());
        }

        let mut product = Product::new(name, description, price_cents, stock)?;
        self.repo.create(None, &product)?;

        tracing::info!(product.id = %product.id(), "product created");
        self.publish_events(&mut product);

        Ok(product)
    }

    fn update(
        &self,
        id: ProductId,
        name: &str,
        description: &str,
        price_cents: i64,
    ) -> Result<Product, ServiceError> {
        let mut product = self
            .repo
            .get_by_id(None, id)?
            .ok_or(DomainError::NotFound)?;

        product.update(name, description, price_cents)?;
        self.repo.update(None, &product)?;

        self.publish_events(&mut product);
        Ok(product)
    }

    fn delete(&self, id: ProductId) -> Result<(), ServiceError> {
        let mut product = self
            .repo
            .get_by_id(None, id)?
            .ok_or(DomainError::NotFound)?;

        product.mark_deleted();
        self.repo.delete(None, id)?;

        self.publish_events(&mut product);
        Ok(())
    }

    fn get(&self, id: ProductId) -> Result<Option<Product>, ServiceError> {
        Ok(self.repo.get_by_id(None, id)?)
    }

    fn get_by_name(&self, name: &str) -> Result<Option<Product>, ServiceError> {
        Ok(self.repo.get_by_name(None, name)?)
    }

    fn list(&self, offset: i64, limit: i64) -> Result<Page<Product>, ServiceError> {
        let page = PageRequest::clamped(
            offset,
            limit,
            self.config.default_page_size,
            self.config.max_page_size,
        );
        Ok(self.repo.list(None, page)?)
    }

    #[tracing::instrument(skip(self), fields(product.id = %id))]
    fn update_stock(&self, id: ProductId, delta: i64) -> Result<(), ServiceError> {
        let mut product = self
            .repo
            .get_by_id(None, id)?
            .ok_or(DomainError::NotFound)?;

        // The aggregate validates the delta; only then does the narrow
        // repository mutation run.
        product.update_stock(delta)?;
        self.repo.update_stock(None, id, delta)?;

        self.publish_events(&mut product);
        Ok(())
    }
}
