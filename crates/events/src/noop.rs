//! No-op event bus.

use std::sync::Arc;

use crate::bus::{EventBus, EventHandler, PublishError};
use crate::envelope::EventEnvelope;

/// Bus with zero handlers.
///
/// The default when no bus is configured, so the service layer never needs a
/// null check. Publishes succeed and go nowhere; subscriptions are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventBus;

impl NoopEventBus {
    pub fn new() -> Self {
        Self
    }
}

impl EventBus for NoopEventBus {
    fn publish(&self, _event: EventEnvelope) -> Result<(), PublishError> {
        Ok(())
    }

    fn subscribe(&self, _handler: Arc<dyn EventHandler>) {}
}
