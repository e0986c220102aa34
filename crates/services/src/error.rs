//! Service-layer error model.

use thiserror::Error;

use storefront_core::DomainError;
use storefront_store::StoreError;

/// Error surfaced by a domain service operation.
///
/// Domain errors (validation, conflicts, illegal transitions) are produced by
/// the aggregates and pass through unchanged; store errors from the primary
/// persistence path are wrapped and propagated. Store errors from secondary
/// effects (event publication, cache population) never reach this type: they
/// are logged at the point of failure by design.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::Domain(DomainError::NotFound))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ServiceError::Domain(DomainError::Conflict(_)))
    }
}
