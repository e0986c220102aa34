//! Audit trail service.

use std::sync::Arc;

use storefront_audit::AuditLog;
use storefront_core::AuditLogId;
use storefront_store::AuditRepository;

use crate::error::ServiceError;

/// Append-and-query surface over the audit trail.
///
/// No events are published here: audit writes are themselves the sink of the
/// event pipeline, and recording the recording would loop.
pub struct AuditService {
    repo: Arc<dyn AuditRepository>,
}

impl AuditService {
    pub fn new(repo: Arc<dyn AuditRepository>) -> Self {
        Self { repo }
    }

    pub fn create(&self, log: &AuditLog) -> Result<(), ServiceError> {
        self.repo.create(log)?;
        tracing::debug!(
            audit.entity_type = %log.entity_type,
            audit.action = %log.action,
            "audit log recorded"
        );
        Ok(())
    }

    pub fn get_by_id(&self, id: AuditLogId) -> Result<Option<AuditLog>, ServiceError> {
        Ok(self.repo.get_by_id(id)?)
    }

    /// All audit records for one entity, oldest first.
    pub fn find_by_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<Vec<AuditLog>, ServiceError> {
        Ok(self.repo.find_by_entity(entity_type, entity_id)?)
    }
}
