//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// This is intentionally small so aggregate crates can decide how they model
/// validation and mutation without bringing in any infrastructure concerns.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
