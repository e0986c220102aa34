//! Event publishing/subscription contracts.

use std::sync::Arc;

use thiserror::Error;

use crate::envelope::EventEnvelope;

/// Subscriber-side contract.
///
/// A handler declares which event names it cares about and processes one
/// envelope at a time on the publisher's thread. Handlers must not perform
/// unbounded blocking I/O without their own timeout: a slow handler directly
/// adds to request latency.
pub trait EventHandler: Send + Sync {
    /// Predicate over event names; the bus only delivers matching events.
    fn interested_in(&self, event_name: &str) -> bool;

    /// Process a single event. Errors are logged by the bus, never
    /// re-raised to the publisher.
    fn handle(&self, event: &EventEnvelope) -> anyhow::Result<()>;
}

/// Event bus publish error.
///
/// Handler failures are *not* publish errors: publish succeeds even when a
/// downstream handler fails. This error covers bus-internal failures only.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("event bus handler registry is poisoned")]
    Poisoned,
}

/// Single-process, synchronous publish/subscribe.
///
/// Implementations invoke every interested handler in registration order on
/// the caller's thread, aggregate (do not short-circuit on) handler errors,
/// and surface those errors via logging only.
pub trait EventBus: Send + Sync {
    fn publish(&self, event: EventEnvelope) -> Result<(), PublishError>;

    fn subscribe(&self, handler: Arc<dyn EventHandler>);
}

impl<B> EventBus for Arc<B>
where
    B: EventBus + ?Sized,
{
    fn publish(&self, event: EventEnvelope) -> Result<(), PublishError> {
        (**self).publish(event)
    }

    fn subscribe(&self, handler: Arc<dyn EventHandler>) {
        (**self).subscribe(handler)
    }
}
