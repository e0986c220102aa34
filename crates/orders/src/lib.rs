//! The Order aggregate and its status state machine.

pub mod order;
pub mod status;

pub use order::{NewOrderItem, Order, OrderEvent, OrderItem};
pub use status::OrderStatus;
