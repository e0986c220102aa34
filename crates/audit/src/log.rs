use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use storefront_core::{AuditLogId, UserId};

/// Append-only record derived from a domain event.
///
/// Audit logs are never updated or deleted; they only accumulate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: AuditLogId,
    pub entity_type: String,
    pub entity_id: String,
    pub action: String,
    pub payload: JsonValue,
    pub timestamp: DateTime<Utc>,
    /// Actor who performed the action, when known.
    pub actor_id: Option<UserId>,
}

impl AuditLog {
    pub fn new(
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        action: impl Into<String>,
        payload: JsonValue,
        actor_id: Option<UserId>,
    ) -> Self {
        Self {
            id: AuditLogId::new(),
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            action: action.into(),
            payload,
            timestamp: Utc::now(),
            actor_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_entity_and_action() {
        let log = AuditLog::new(
            "order",
            "order-1",
            "created",
            serde_json::json!({"total_cents": 2997}),
            None,
        );
        assert_eq!(log.entity_type, "order");
        assert_eq!(log.action, "created");
        assert!(log.actor_id.is_none());
    }
}
