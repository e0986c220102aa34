//! In-memory transaction factory.
//!
//! The in-memory repositories apply writes immediately, so these handles
//! carry no buffered state; they exist so services exercise the same
//! begin/commit/rollback choreography they would against a real store, and
//! so tests can observe transaction outcomes.

use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use storefront_store::{StoreError, StoreKind, Transaction, TransactionFactory, TransactionHandle};

#[derive(Debug, Default)]
struct Outcomes {
    committed: AtomicU64,
    rolled_back: AtomicU64,
}

struct InMemoryTxHandle {
    outcomes: Arc<Outcomes>,
}

impl TransactionHandle for InMemoryTxHandle {
    fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.outcomes.committed.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.outcomes.rolled_back.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Hands out no-op transactions tagged with whatever store the caller asks
/// for, and counts how each one ended.
#[derive(Debug, Default)]
pub struct InMemoryTransactionFactory {
    outcomes: Arc<Outcomes>,
}

impl InMemoryTransactionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn committed(&self) -> u64 {
        self.outcomes.committed.load(Ordering::Relaxed)
    }

    pub fn rolled_back(&self) -> u64 {
        self.outcomes.rolled_back.load(Ordering::Relaxed)
    }
}

impl TransactionFactory for InMemoryTransactionFactory {
    fn begin(&self, store: StoreKind) -> Result<Transaction, StoreError> {
        let handle = InMemoryTxHandle {
            outcomes: self.outcomes.clone(),
        };
        Ok(Transaction::new(store, Box::new(handle)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_commit_and_rollback_outcomes() {
        let factory = InMemoryTransactionFactory::new();

        factory
            .begin(StoreKind::Relational)
            .unwrap()
            .commit()
            .unwrap();
        factory
            .begin(StoreKind::Relational)
            .unwrap()
            .rollback()
            .unwrap();

        assert_eq!(factory.committed(), 1);
        assert_eq!(factory.rolled_back(), 1);
    }
}
