//! Infrastructure error model for stores, caches and transports.

use thiserror::Error;

use crate::transaction::StoreKind;

/// Opaque infrastructure failure from a backing store, cache or transport.
///
/// These are wrapped and propagated when they hit the primary write path,
/// and logged-but-swallowed for best-effort secondary effects.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached (timeout, connection loss).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store rejected or failed the operation.
    #[error("store backend error: {0}")]
    Backend(String),

    /// A repository received a transaction opened against a different store.
    /// This is a programming error and is reported immediately.
    #[error("expected a {expected} transaction, received {actual}")]
    TransactionMismatch {
        expected: StoreKind,
        actual: StoreKind,
    },

    /// A value could not be (de)serialized on its way to or from a store.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
