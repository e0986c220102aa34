//! Drain-and-publish helper shared by the domain services.

use serde::Serialize;

use storefront_events::{DomainEvent, EventBus, EventEnvelope};

/// Publish every drained event, best-effort.
///
/// Publication is a secondary effect: a serialization or publish failure is
/// logged and never rolls back the already-committed persistence change.
pub(crate) fn publish_all<E>(bus: &dyn EventBus, aggregate_id: &str, events: Vec<E>)
where
    E: DomainEvent + Serialize,
{
    for event in events {
        let envelope = match EventEnvelope::from_event(aggregate_id, &event) {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::error!(
                    event_name = event.name(),
                    aggregate_id,
                    error = %err,
                    "failed to serialize domain event"
                );
                continue;
            }
        };

        if let Err(err) = bus.publish(envelope) {
            tracing::error!(
                event_name = event.name(),
                aggregate_id,
                error = %err,
                "failed to publish domain event"
            );
        }
    }
}
