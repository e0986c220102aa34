//! Cache-aside decorator for the user service.
//!
//! Reads consult the cache first and fall through to the delegate on a miss;
//! writes go to the delegate first and then invalidate (or refresh) the
//! affected keys. A cache failure is logged and the operation continues
//! against the delegate: the cache is never allowed to turn a working store
//! into an outage.

use std::sync::Arc;

use metrics::counter;

use storefront_core::{Page, UserId};
use storefront_store::Cache;
use storefront_users::User;

use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::user_service::UserService;

fn user_key(id: UserId) -> String {
    format!("user:{id}")
}

fn email_key(email: &str) -> String {
    format!("user:email:{email}")
}

/// [`UserService`] decorator adding cache-aside reads over any delegate.
pub struct CachedUserService {
    delegate: Arc<dyn UserService>,
    cache: Arc<dyn Cache>,
    config: ServiceConfig,
}

impl CachedUserService {
    pub fn new(
        delegate: Arc<dyn UserService>,
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

    fn store_user(&self, user: &User) {
        match serde_json::to_string(user) {
            Ok(serialized) => {
                self.cache_set(&user_key(user.id()), &serialized);
                self.cache_set(&email_key(user.email()), &user.id().to_string());
            }
            Err(err) => tracing::warn!(error = %err, "failed to serialize user for caching"),
        }
    }

}

impl UserService for CachedUserService {
    fn create(&self, email: &str, name: &str, password_hash: &str) -> Result<User, ServiceError> {
        let user = self.delegate.create(email, name, password_hash)?;
        self.store_user(&user);
        Ok(user)
    }

    fn update(&self, id: UserId, name: &str) -> Result<User, ServiceError> {
        let user = self.delegate.update(id, name)?;
        self.store_user(&user);
        Ok(user)
    }

    fn update_password(&self, id: UserId, password_hash: &str) -> Result<(), ServiceError> {
        self.delegate.update_password(id, password_hash)?;
        // The serialized copy carries the old hash; drop it and let the next
        // read repopulate.
        self.cache_delete(&user_key(id));
        Ok(())
    }

    fn delete(&self, id: UserId) -> Result<(), ServiceError> {
        // Capture the pre-image first (the email is unreadable afterwards),
        // but only invalidate once the delegate has actually deleted.
        let pre_image = self.delegate.get(id).ok().flatten();
        self.delegate.delete(id)?;

        if let Some(user) = pre_image {
            self.cache_delete(&email_key(user.email()));
        }
        self.cache_delete(&user_key(id));
        Ok(())
    }

    fn get(&self, id: UserId) -> Result<Option<User>, ServiceError> {
        let key = user_key(id);
        if let Some(cached) = self.cache_get(&key) {
            match serde_json::from_str::<User>(&cached) {
                Ok(user) => {
                    counter!("cache_hits_total", "entity" => "user").increment(1);
                    return Ok(Some(user));
                }
                Err(err) => {
                    // A corrupt entry is treated as a miss and evicted.
                    tracing::warn!(key, error = %err, "evicting undecodable cache entry");
                    self.cache_delete(&key);
                }
            }
        }
        counter!("cache_misses_total", "entity" => "user").increment(1);

        let user = self.delegate.get(id)?;
        if let Some(user) = &user {
            self.store_user(user);
        }
        Ok(user)
    }

    fn get_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        // The email key stores only the id; the hit re-enters the id path so
        // the primary entry stays the single serialized copy and the lookup
        // is counted exactly once, by the inner get.
        if let Some(raw_id) = self.cache_get(&email_key(email)) {
            if let Ok(id) = raw_id.parse::<UserId>() {
                return self.get(id);
            }
            self.cache_delete(&email_key(email));
        }
        counter!("cache_misses_total", "entity" => "user").increment(1);

        let user = self.delegate.get_by_email(email)?;
        if let Some(user) = &user {
            self.store_user(user);
        }
        Ok(user)
    }

    /// Listings are unbounded in shape and churn too fast to cache usefully;
    /// they always pass through.
    fn list(&self, offset: i64, limit: i64) -> Result<Page<User>, ServiceError> {
        self.delegate.list(offset, limit)
    }
}
