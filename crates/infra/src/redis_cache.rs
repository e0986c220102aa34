//! Redis-backed cache adapter (behind the `redis` feature).

use std::time::Duration;

use redis::Commands;

use storefront_store::{Cache, StoreError};

/// [`Cache`] over a Redis instance. Entries expire server-side via `SETEX`.
pub struct RedisCache {
    client: redis::Client,
}

impl RedisCache {
    pub fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url).map_err(map_err)?;
        Ok(Self { client })
    }

    fn connection(&self) -> Result<redis::Connection, StoreError> {
        self.client.get_connection().map_err(map_err)
    }
}

fn map_err(err: redis::RedisError) -> StoreError {
    if err.is_connection_refusal() || err.is_timeout() {
        StoreError::Unavailable(err.to_string())
    } else {
        StoreError::Backend(err.to_string())
    }
}

impl Cache for RedisCache {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection()?;
        conn.get(key).map_err(map_err)
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.connection()?;
        // Sub-second TTLs round up so an entry never outlives a zero expiry.
        let secs = ttl.as_secs().max(1);
        conn.set_ex(key, value, secs).map_err(map_err)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.connection()?;
        conn.del(key).map_err(map_err)
    }
}
