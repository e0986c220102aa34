//! Inbound side of the audit pipeline.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use storefront_audit::AuditLog;
use storefront_core::{AuditLogId, UserId};
use storefront_events::AuditMessage;
use storefront_services::AuditService;

/// Decodes audit messages off the transport and records them.
///
/// The driving loop (broker poll, in-memory drain) lives with whoever owns
/// the transport; this type only knows how to process one message.
pub struct AuditConsumer {
    audit: Arc<AuditService>,
}

impl AuditConsumer {
    pub fn new(audit: Arc<AuditService>) -> Self {
        Self { audit }
    }

    /// Decode and record a single message payload.
    pub fn consume(&self, value: &[u8]) -> anyhow::Result<()> {
        let message: AuditMessage = serde_json::from_slice(value)?;

        let timestamp = DateTime::parse_from_rfc3339(&message.timestamp)?.with_timezone(&Utc);
        let actor_id = match &message.actor_id {
            Some(raw) => Some(raw.parse::<UserId>()?),
            None => None,
        };

        let log = AuditLog {
            id: message.id.parse::<AuditLogId>()?,
            entity_type: message.entity_type,
            entity_id: message.entity_id,
            action: message.action,
            payload: message.payload,
            timestamp,
            actor_id,
        };

        self.audit.create(&log)?;
        Ok(())
    }
}
