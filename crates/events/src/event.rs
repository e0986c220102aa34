//! A domain-agnostic event.
//!
//! Events are:
//! - **immutable** (treat them as facts)
//! - named with a stable `entity.action` identifier
//! - designed to be **append-only**

/// A named, immutable fact recorded by an aggregate.
///
/// The name is the stable wire identifier (e.g. `"order.created"`,
/// `"product.stock_updated"`) consumed by handlers and the audit pipeline.
pub trait DomainEvent: core::fmt::Debug + Send + Sync {
    /// Stable event name in `entity.action` form.
    fn name(&self) -> &'static str;
}
