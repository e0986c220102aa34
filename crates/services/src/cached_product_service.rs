//! Cache-aside decorator for the product service.
//!
//! Same shape as the user decorator, with one extra wrinkle: products can be
//! renamed, so updates must invalidate the name lookup key for the pre-image
//! name before refreshing the cache.

use std::sync::Arc;

use metrics::counter;

use storefront_core::{Page, ProductId};
use storefront_products::Product;
use storefront_store::Cache;

use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::product_service::ProductService;

fn product_key(id: ProductId) -> String {
    format!("product:{id}")
}

fn name_key(name: &str) -> String {
    format!("product:name:{name}")
}

/// [`ProductService`] decorator adding cache-aside reads over any delegate.
pub struct CachedProductService {
    delegate: Arc<dyn ProductService>,
    cache: Arc<dyn Cache>,
    config: ServiceConfig,
}

impl CachedProductService {
    pub fn new(
        delegate: Arc<dyn ProductService>,
        cache: Arc<dyn Cache>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            delegate,
            cache,
            config,
        }
    }

    fn cache_get(&self, key: &str) -> Option<String> {
        match self.cache.get(key) {
            Ok(hit) => hit,
            Err(err) => {
                tracing::warn!(key, error = %err, "cache read failed");
                None
            }
        }
    }

    fn cache_set(&self, key: &str, value: &str) {
        if let Err(err) = self.cache.set(key, value, self.config.cache_ttl) {
            tracing::warn!(key, error = %err, "cache write failed");
        }
    }

    fn cache_delete(&self, key: &str) {
        if let Err(err) = self.cache.delete(key) {
            tracing::warn!(key, error = %err, "cache invalidation failed");
        }
    }

    fn store_product(&self, product: &Product) {
        match serde_json::to_string(product) {
            Ok(serialized) => {
                self.cache_set(&product_key(product.id()), &serialized);
                self.cache_set(&name_key(product.name()), &product.id().to_string());
            }
            Err(err) => tracing::warn!(error = %err, "failed to serialize product for caching"),
        }
    }

}

impl ProductService for CachedProductService {
    fn create(
        &self,
        name: &str,
        description: &str,
        price_cents: i64,
        stock: i64,
    ) -> Result<Product, ServiceError> {
        let product = self.delegate.create(name, description, price_cents, stock)?;
        self.store_product(&product);
        Ok(product)
    }

    fn update(
        &self,
        id: ProductId,
        name: &str,
        description: &str,
        price_cents: i64,
    ) -> Result<Product, ServiceError> {
        // Capture the pre-image name before the rename lands; invalidate its
        // key only once the delegate has committed the update.
        let pre_image = self.delegate.get(id).ok().flatten();
        let product = self.delegate.update(id, name, description, price_cents)?;

        if let Some(old) = pre_image {
            if old.name() != product.name() {
                self.cache_delete(&name_key(old.name()));
            }
        }
        self.store_product(&product);
        Ok(product)
    }

    fn delete(&self, id: ProductId) -> Result<(), ServiceError> {
        let pre_image = self.delegate.get(id).ok().flatten();
        self.delegate.delete(id)?;

        if let Some(product) = pre_image {
            self.cache_delete(&name_key(product.name()));
        }
        self.cache_delete(&product_key(id));
        Ok(())
    }

    fn get(&self, id: ProductId) -> Result<Option<Product>, ServiceError> {
        let key = product_key(id);
        if let Some(cached) = self.cache_get(&key) {
            match serde_json::from_str::<Product>(&cached) {
                Ok(product) => {
                    counter!("cache_hits_total", "entity" => "product").increment(1);
                    return Ok(Some(product));
                }
                Err(err) => {
                    tracing::warn!(key, error = %err, "evicting undecodable cache entry");
                    self.cache_delete(&key);
                }
            }
        }
        counter!("cache_misses_total", "entity" => "product").increment(1);

        let product = self.delegate.get(id)?;
        if let Some(product) = &product {
            self.store_product(product);
        }
        Ok(product)
    }

    fn get_by_name(&self, name: &str) -> Result<Option<Product>, ServiceError> {
        // A name-key hit re-enters the id path, which counts the lookup once.
        if let Some(raw_id) = self.cache_get(&name_key(name)) {
            if let Ok(id) = raw_id.parse::<ProductId>() {
                return self.get(id);
            }
            self.cache_delete(&name_key(name));
        }
        counter!("cache_misses_total", "entity" => "product").increment(1);

        let product = self.delegate.get_by_name(name)?;
        if let Some(product) = &product {
            self.store_product(product);
        }
        Ok(product)
    }

    fn list(&self, offset: i64, limit: i64) -> Result<Page<Product>, ServiceError> {
        self.delegate.list(offset, limit)
    }

    fn update_stock(&self, id: ProductId, delta: i64) -> Result<(), ServiceError> {
        self.delegate.update_stock(id, delta)?;
        // The serialized copy now carries a stale stock value; drop it and
        // let the next read repopulate.
        self.cache_delete(&product_key(id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use storefront_core::DomainError;
    use storefront_store::StoreError;

    /// Plain map cache; TTL is ignored.
    #[derive(Default)]
    struct MapCache(Mutex<HashMap<String, String>>);

    impl Cache for MapCache {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            Ok(self.0.lock().unwrap().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str, _ttl: Duration) -> Result<(), StoreError> {
            self.0.lock().unwrap().insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn delete(&self, key: &str) -> Result<(), StoreError> {
            self.0.lock().unwrap().remove(key);
            Ok(())
        }
    }

    /// Delegate holding one product whose update always fails.
    struct FailingUpdate {
        product: Product,
        reads: AtomicUsize,
    }

    impl ProductService for FailingUpdate {
        fn create(
            &self,
            _name: &str,
            _description: &str,
            _price_cents: i64,
            _stock: i64,
        ) -> Result<Product, ServiceError> {
            Ok(self.product.clone())
        }

        fn update(
            &self,
            _id: ProductId,
            _name: &str,
            _description: &str,
            _price_cents: i64,
        ) -> Result<Product, ServiceError> {
            Err(DomainError::validation("rejected").into())
        }

        fn delete(&self, _id: ProductId) -> Result<(), ServiceError> {
            Ok(())
        }

        fn get(&self, id: ProductId) -> Result<Option<Product>, ServiceError> {
            self.reads.fetch_add(1, Ordering::Relaxed);
            Ok((self.product.id() == id).then(|| self.product.clone()))
        }

        fn get_by_name(&self, name: &str) -> Result<Option<Product>, ServiceError> {
            self.reads.fetch_add(1, Ordering::Relaxed);
            Ok((self.product.name() == name).then(|| self.product.clone()))
        }

        fn list(&self, _offset: i64, _limit: i64) -> Result<Page<Product>, ServiceError> {
            Ok(Page::empty())
        }

        fn update_stock(&self, _id: ProductId, _delta: i64) -> Result<(), ServiceError> {
            Ok(())
        }
    }

    #[test]
    fn a_failed_update_leaves_both_cache_keys_alone() {
        let product = Product::new("Widget", "", 999, 5).unwrap();
        let delegate = Arc::new(FailingUpdate {
            product: product.clone(),
            reads: AtomicUsize::new(0),
        });
        let cached = CachedProductService::new(
            delegate.clone(),
            Arc::new(MapCache::default()),
            ServiceConfig::default(),
        );

        // Populate primary and name keys.
        cached.get_by_name("Widget").unwrap().unwrap();
        assert_eq!(delegate.reads.load(Ordering::Relaxed), 1);

        let err = cached.update(product.id(), "Renamed", "", 999).unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Validation(_))));

        // The pre-image capture read the delegate once more; both keys still
        // serve from the cache.
        cached.get_by_name("Widget").unwrap().unwrap();
        cached.get(product.id()).unwrap().unwrap();
        assert_eq!(delegate.reads.load(Ordering::Relaxed), 2);
    }
}
