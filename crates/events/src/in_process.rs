//! Synchronous in-process event bus.

use std::sync::{Arc, RwLock};

use crate::bus::{EventBus, EventHandler, PublishError};
use crate::envelope::EventEnvelope;

/// In-process pub/sub bus.
///
/// - No IO / no async: handlers run on the publishing thread.
/// - Handlers are invoked in registration order.
/// - A failing handler is logged and the remaining handlers still run.
#[derive(Default)]
pub struct InProcessEventBus {
    handlers: RwLock<Vec<Arc<dyn EventHandler>>>,
}

impl InProcessEventBus {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventBus for InProcessEventBus {
    fn publish(&self, event: EventEnvelope) -> Result<(), PublishError> {
        let handlers = self.handlers.read().map_err(|_| PublishError::Poisoned)?;

        for handler in handlers.iter() {
            if !handler.interested_in(event.name()) {
                continue;
            }
            if let Err(err) = handler.handle(&event) {
                tracing::error!(
                    event_name = event.name(),
                    event_id = %event.event_id(),
                    error = %err,
                    "event handler failed"
                );
            }
        }

        Ok(())
    }

    fn subscribe(&self, handler: Arc<dyn EventHandler>) {
        if let Ok(mut handlers) = self.handlers.write() {
            handlers.push(handler);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: AtomicUsize,
        only: Option<&'static str>,
        fail: bool,
    }

    impl Counting {
        fn new(only: Option<&'static str>, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                only,
                fail,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl EventHandler for Counting {
        fn interested_in(&self, event_name: &str) -> bool {
            self.only.is_none_or(|n| n == event_name)
        }

        fn handle(&self, _event: &EventEnvelope) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("boom");
            }
            Ok(())
        }
    }

    fn envelope(name: &str) -> EventEnvelope {
        EventEnvelope::new(name, "agg-1", serde_json::json!({}))
    }

    #[test]
    fn delivers_only_to_interested_handlers() {
        let bus = InProcessEventBus::new();
        let users = Counting::new(Some("user.created"), false);
        let all = Counting::new(None, false);
        bus.subscribe(users.clone());
        bus.subscribe(all.clone());

        bus.publish(envelope("order.created")).unwrap();
        bus.publish(envelope("user.created")).unwrap();

        assert_eq!(users.calls(), 1);
        assert_eq!(all.calls(), 2);
    }

    #[test]
    fn failing_handler_does_not_fail_publish_or_starve_later_handlers() {
        let bus = InProcessEventBus::new();
        let failing = Counting::new(None, true);
        let healthy = Counting::new(None, false);
        bus.subscribe(failing.clone());
        bus.subscribe(healthy.clone());

        assert!(bus.publish(envelope("product.updated")).is_ok());
        assert_eq!(failing.calls(), 1);
        assert_eq!(healthy.calls(), 1);
    }
}
