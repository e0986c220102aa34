//! The append-only audit log record.

pub mod log;

pub use log::AuditLog;
