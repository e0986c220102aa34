//! Immutable service configuration snapshot.

use std::time::Duration;

/// Configuration handed to a service at construction.
///
/// The snapshot is immutable: reloading configuration means building a new
/// snapshot and constructing new services from it, never mutating shared
/// state in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Page size applied when a caller passes a non-positive limit.
    pub default_page_size: u64,
    /// Hard cap on caller-supplied page sizes.
    pub max_page_size: u64,
    /// Time-to-live for cache entries written by the decorators.
    pub cache_ttl: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 100,
            cache_ttl: Duration::from_secs(30 * 60),
        }
    }
}
