//! Envelope for a published domain event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::event::DomainEvent;

/// The unit handed to the event bus.
///
/// The raising aggregate owns its typed events until the service layer drains
/// them; from that point the envelope (id, name, aggregate id, business time,
/// JSON payload) is what travels through handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    event_id: Uuid,
    name: String,
    aggregate_id: String,
    occurred_at: DateTime<Utc>,
    payload: JsonValue,
}

impl EventEnvelope {
    pub fn new(
        name: impl Into<String>,
        aggregate_id: impl Into<String>,
        payload: JsonValue,
    ) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            name: name.into(),
            aggregate_id: aggregate_id.into(),
            occurred_at: Utc::now(),
            payload,
        }
    }

    /// Wrap a typed domain event for publication.
    pub fn from_event<E>(aggregate_id: impl Into<String>, event: &E) -> serde_json::Result<Self>
    where
        E: DomainEvent + Serialize,
    {
        Ok(Self::new(
            event.name(),
            aggregate_id,
            serde_json::to_value(event)?,
        ))
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aggregate_id(&self) -> &str {
        &self.aggregate_id
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn payload(&self) -> &JsonValue {
        &self.payload
    }
}
