//! Cache contract consumed by the service-layer decorators.

use std::time::Duration;

use crate::error::StoreError;

/// Opaque string-keyed cache over serialized values.
///
/// Errors from any of these operations are non-fatal to callers: the cache
/// is an optimization layer with TTL-bounded staleness, not a source of
/// truth.
pub trait Cache: Send + Sync {
    /// `Ok(None)` means a miss (absent or expired).
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    fn delete(&self, key: &str) -> Result<(), StoreError>;
}
