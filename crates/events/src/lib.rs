//! Domain event contracts and in-process distribution.
//!
//! Aggregates record typed events; the service layer drains them, wraps each
//! in an [`EventEnvelope`] and hands it to an [`EventBus`]. Distribution is
//! synchronous and in-process: handlers run on the publishing thread, in
//! registration order, and individual handler failures never fail the
//! publish.

pub mod audit;
pub mod bus;
pub mod envelope;
pub mod event;
pub mod handlers;
pub mod in_process;
pub mod noop;

pub use audit::{AuditForwarder, AuditMessage, MessageProducer};
pub use bus::{EventBus, EventHandler, PublishError};
pub use envelope::EventEnvelope;
pub use event::DomainEvent;
pub use handlers::LoggingEventHandler;
pub use in_process::InProcessEventBus;
pub use noop::NoopEventBus;
