//! Audit forwarding boundary.
//!
//! The [`AuditForwarder`] subscribes to all domain events, flattens each into
//! an [`AuditMessage`] and hands it to an outbound [`MessageProducer`]. A
//! separate consumer (outside this crate) deserializes the message and writes
//! an audit record.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::bus::EventHandler;
use crate::envelope::EventEnvelope;

/// Outbound message transport (broker wiring lives behind this seam).
pub trait MessageProducer: Send + Sync {
    fn send(&self, topic: &str, key: &[u8], value: &[u8]) -> anyhow::Result<()>;
}

/// Flat audit record as it travels over the message transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditMessage {
    pub id: String,
    pub event_name: String,
    pub entity_type: String,
    pub entity_id: String,
    pub action: String,
    pub payload: JsonValue,
    /// RFC3339 business timestamp.
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,
}

impl AuditMessage {
    /// Flatten a published envelope into the audit wire shape.
    pub fn from_envelope(event: &EventEnvelope) -> Self {
        let (entity_type, action) = split_event_name(event.name());
        Self {
            id: event.event_id().to_string(),
            event_name: event.name().to_string(),
            entity_type: entity_type.to_string(),
            entity_id: event.aggregate_id().to_string(),
            action: action.to_string(),
            payload: event.payload().clone(),
            timestamp: event.occurred_at().to_rfc3339(),
            actor_id: None,
        }
    }
}

/// Split an `entity.action` event name into its parts.
fn split_event_name(name: &str) -> (&str, &str) {
    match name.split_once('.') {
        Some((entity, action)) if !entity.is_empty() && !action.is_empty() => (entity, action),
        _ => ("unknown", "unknown"),
    }
}

/// Forwards every domain event to the audit transport.
pub struct AuditForwarder {
    producer: Arc<dyn MessageProducer>,
    topic: String,
}

impl AuditForwarder {
    pub fn new(producer: Arc<dyn MessageProducer>, topic: impl Into<String>) -> Self {
        Self {
            producer,
            topic: topic.into(),
        }
    }
}

impl EventHandler for AuditForwarder {
    fn interested_in(&self, _event_name: &str) -> bool {
        // Audit everything.
        true
    }

    fn handle(&self, event: &EventEnvelope) -> anyhow::Result<()> {
        let message = AuditMessage::from_envelope(event);
        let value = serde_json::to_vec(&message)?;
        self.producer
            .send(&self.topic, message.id.as_bytes(), &value)?;

        tracing::debug!(
            event_name = event.name(),
            topic = %self.topic,
            "audit event forwarded"
        );
        Ok(())
    }
}
