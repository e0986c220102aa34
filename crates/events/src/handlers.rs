//! General-purpose event handlers.

use crate::bus::EventHandler;
use crate::envelope::EventEnvelope;

/// Logs every published event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingEventHandler;

impl LoggingEventHandler {
    pub fn new() -> Self {
        Self
    }
}

impl EventHandler for LoggingEventHandler {
    fn interested_in(&self, _event_name: &str) -> bool {
        true
    }

    fn handle(&self, event: &EventEnvelope) -> anyhow::Result<()> {
        tracing::info!(
            event_id = %event.event_id(),
            event_name = event.name(),
            aggregate_id = event.aggregate_id(),
            occurred_at = %event.occurred_at(),
            "event received"
        );
        Ok(())
    }
}
