//! Store-agnostic unit of work.
//!
//! A [`Transaction`] is a tagged handle: the identity of the store it was
//! opened against plus an opaque store-specific handle. Repositories
//! capability-check the tag at their boundary and fail fast on mismatch
//! instead of silently using the wrong connection.

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Identity of a backing store a unit of work can be opened against.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Relational,
    Document,
    KeyValue,
}

impl core::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            StoreKind::Relational => "relational",
            StoreKind::Document => "document",
            StoreKind::KeyValue => "key-value",
        };
        f.write_str(name)
    }
}

/// Store-specific half of a transaction.
///
/// Concrete adapters implement this over their native handle; the service
/// layer only ever sees the tagged [`Transaction`] wrapper.
pub trait TransactionHandle: Send {
    fn commit(self: Box<Self>) -> Result<(), StoreError>;

    fn rollback(self: Box<Self>) -> Result<(), StoreError>;

    /// Escape hatch for repository implementations to reach the native
    /// handle. Prefer [`Transaction::downcast_ref`].
    fn as_any(&self) -> &dyn Any;
}

/// A unit of work scoped to a single store and a single logical operation.
pub struct Transaction {
    store: StoreKind,
    handle: Box<dyn TransactionHandle>,
}

impl Transaction {
    pub fn new(store: StoreKind, handle: Box<dyn TransactionHandle>) -> Self {
        Self { store, handle }
    }

    pub fn store(&self) -> StoreKind {
        self.store
    }

    pub fn commit(self) -> Result<(), StoreError> {
        self.handle.commit()
    }

    pub fn rollback(self) -> Result<(), StoreError> {
        self.handle.rollback()
    }

    /// Assert that this transaction was opened against `expected`.
    ///
    /// Passing the wrong store's transaction to a repository is a
    /// programming error; it is reported immediately, never ignored.
    pub fn expect_store(&self, expected: StoreKind) -> Result<(), StoreError> {
        if self.store != expected {
            return Err(StoreError::TransactionMismatch {
                expected,
                actual: self.store,
            });
        }
        Ok(())
    }

    /// Borrow the underlying store-specific handle.
    pub fn downcast_ref<T: 'static>(&self) -> Result<&T, StoreError> {
        self.handle
            .as_any()
            .downcast_ref::<T>()
            .ok_or_else(|| StoreError::Backend(format!(
                "transaction handle for the {} store has an unexpected concrete type",
                self.store
            )))
    }
}

impl core::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Transaction")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

/// Opens units of work against named stores.
pub trait TransactionFactory: Send + Sync {
    fn begin(&self, store: StoreKind) -> Result<Transaction, StoreError>;
}
