//! Order status lifecycle.

use serde::{Deserialize, Serialize};

/// Order status.
///
/// Transition table:
///
/// | From      | Allowed targets      |
/// |-----------|----------------------|
/// | pending   | confirmed, canceled  |
/// | confirmed | shipped, canceled    |
/// | shipped   | delivered, canceled  |
/// | delivered | (none)               |
/// | canceled  | (none)               |
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Canceled,
}

impl OrderStatus {
    /// Whether the transition `self -> target` is legal.
    pub fn can_transition_to(self, target: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, target),
            (Pending, Confirmed)
                | (Pending, Canceled)
                | (Confirmed, Shipped)
                | (Confirmed, Canceled)
                | (Shipped, Delivered)
                | (Shipped, Canceled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Canceled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Canceled => "canceled",
        }
    }

    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Canceled,
    ];
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_allow_no_transitions() {
        for target in OrderStatus::ALL {
            assert!(!OrderStatus::Delivered.can_transition_to(target));
            assert!(!OrderStatus::Canceled.can_transition_to(target));
        }
    }

    #[test]
    fn exact_transition_table() {
        use OrderStatus::*;
        let legal = [
            (Pending, Confirmed),
            (Pending, Canceled),
            (Confirmed, Shipped),
            (Confirmed, Canceled),
            (Shipped, Delivered),
            (Shipped, Canceled),
        ];
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                assert_eq!(
                    from.can_transition_to(to),
                    legal.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
    }
}
