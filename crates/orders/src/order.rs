use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, Entity, OrderId, OrderItemId, ProductId, UserId};
use storefront_events::DomainEvent;

use crate::status::OrderStatus;

/// Line item carried by an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub created_at: DateTime<Utc>,
}

/// Input shape for a line item before the order assigns identities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

/// Aggregate root: Order.
///
/// The total is always recomputed from the items, never set externally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    user_id: UserId,
    items: Vec<OrderItem>,
    total_cents: i64,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,

    #[serde(skip)]
    events: Vec<OrderEvent>,
}

impl Order {
    /// Validating factory. Requires at least one item; every item must have
    /// a positive quantity and a positive unit price.
    pub fn new(user_id: UserId, items: Vec<NewOrderItem>) -> DomainResult<Self> {
        if items.is_empty() {
            return Err(DomainError::validation("order must have at least one item"));
        }

        let now = Utc::now();
        let id = OrderId::new();

        let mut order_items = Vec::with_capacity(items.len());
        for item in items {
            if item.quantity == 0 {
                return Err(DomainError::validation(
                    "order item quantity must be greater than zero",
                ));
            }
            if item.unit_price_cents <= 0 {
                return Err(DomainError::validation(
                    "order item price must be greater than zero",
                ));
            }
            order_items.push(OrderItem {
                id: OrderItemId::new(),
                order_id: id,
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price_cents: item.unit_price_cents,
                created_at: now,
            });
        }

        let mut order = Self {
            id,
            user_id,
            items: order_items,
            total_cents: 0,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            events: Vec::new(),
        };
        order.recompute_total();

        order.record(OrderEvent::Created {
            user_id,
            item_count: order.items.len(),
            total_cents: order.total_cents,
        });

        Ok(order)
    }

    fn recompute_total(&mut self) {
        self.total_cents = self
            .items
            .iter()
            .map(|item| i64::from(item.quantity) * item.unit_price_cents)
            .sum();
    }

    /// Move the order to `target` if the state machine allows it.
    ///
    /// Illegal transitions fail with [`DomainError::InvalidTransition`] and
    /// leave the order unchanged.
    pub fn transition(&mut self, target: OrderStatus) -> DomainResult<()> {
        if !self.status.can_transition_to(target) {
            return Err(DomainError::invalid_transition(format!(
                "order cannot move from {} to {}",
                self.status, target
            )));
        }

        let old_status = self.status;
        self.status = target;
        self.updated_at = Utc::now();

        self.record(OrderEvent::StatusChanged {
            order_id: self.id,
            old_status,
            new_status: target,
        });
        Ok(())
    }

    /// Cancel the order.
    ///
    /// Cancelling an already-canceled order is a [`DomainError::Conflict`],
    /// distinct from an illegal transition, so double-cancel attempts are
    /// visible to callers.
    pub fn cancel(&mut self) -> DomainResult<()> {
        if self.status == OrderStatus::Canceled {
            return Err(DomainError::conflict("order is already canceled"));
        }
        if !self.status.can_transition_to(OrderStatus::Canceled) {
            return Err(DomainError::invalid_transition(format!(
                "order cannot be canceled from {}",
                self.status
            )));
        }

        let old_status = self.status;
        self.status = OrderStatus::Canceled;
        self.updated_at = Utc::now();

        self.record(OrderEvent::Canceled {
            order_id: self.id,
            old_status,
        });
        Ok(())
    }

    /// Soft delete.
    pub fn mark_deleted(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;

        self.record(OrderEvent::Deleted { id: self.id });
    }

    /// Return the pending events and clear the buffer.
    pub fn drain_events(&mut self) -> Vec<OrderEvent> {
        std::mem::take(&mut self.events)
    }

    fn record(&mut self, event: OrderEvent) {
        self.events.push(event);
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn total_cents(&self) -> i64 {
        self.total_cents
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Order domain events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OrderEvent {
    Created {
        user_id: UserId,
        item_count: usize,
        total_cents: i64,
    },
    StatusChanged {
        order_id: OrderId,
        old_status: OrderStatus,
        new_status: OrderStatus,
    },
    Canceled {
        order_id: OrderId,
        old_status: OrderStatus,
    },
    Deleted {
        id: OrderId,
    },
}

impl DomainEvent for OrderEvent {
    fn name(&self) -> &'static str {
        match self {
            OrderEvent::Created { .. } => "order.created",
            OrderEvent::StatusChanged { .. } => "order.status_changed",
            OrderEvent::Canceled { .. } => "order.canceled",
            OrderEvent::Deleted { .. } => "order.deleted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: u32, unit_price_cents: i64) -> NewOrderItem {
        NewOrderItem {
            product_id: ProductId::new(),
            quantity,
            unit_price_cents,
        }
    }

    fn pending_order() -> Order {
        Order::new(UserId::new(), vec![item(3, 999)]).unwrap()
    }

    #[test]
    fn new_order_computes_total_and_starts_pending() {
        let mut order = pending_order();
        assert_eq!(order.total_cents(), 2997);
        assert_eq!(order.status(), OrderStatus::Pending);

        let events = order.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name(), "order.created");
    }

    #[test]
    fn items_receive_identities_scoped_to_the_order() {
        let order = Order::new(UserId::new(), vec![item(1, 100), item(2, 50)]).unwrap();
        for line in order.items() {
            assert_eq!(line.order_id, order.id());
        }
        assert_ne!(order.items()[0].id, order.items()[1].id);
    }

    #[test]
    fn rejects_empty_item_list() {
        let err = Order::new(UserId::new(), vec![]).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn rejects_zero_quantity_and_non_positive_price() {
        assert!(Order::new(UserId::new(), vec![item(0, 100)]).is_err());
        assert!(Order::new(UserId::new(), vec![item(1, 0)]).is_err());
        assert!(Order::new(UserId::new(), vec![item(1, -5)]).is_err());
    }

    #[test]
    fn legal_transitions_emit_exactly_one_status_event() {
        let mut order = pending_order();
        order.drain_events();

        order.transition(OrderStatus::Confirmed).unwrap();
        order.transition(OrderStatus::Shipped).unwrap();
        order.transition(OrderStatus::Delivered).unwrap();

        let events = order.drain_events();
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| e.name() == "order.status_changed"));
        assert_eq!(order.status(), OrderStatus::Delivered);
    }

    #[test]
    fn illegal_transition_fails_and_leaves_status_unchanged() {
        let mut order = pending_order();
        order.transition(OrderStatus::Confirmed).unwrap();
        order.drain_events();

        let err = order.transition(OrderStatus::Delivered).unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition(_)));
        assert_eq!(order.status(), OrderStatus::Confirmed);
        assert!(order.drain_events().is_empty());
    }

    #[test]
    fn cancel_is_reachable_from_pending_confirmed_and_shipped() {
        for setup in [
            vec![],
            vec![OrderStatus::Confirmed],
            vec![OrderStatus::Confirmed, OrderStatus::Shipped],
        ] {
            let mut order = pending_order();
            for status in setup {
                order.transition(status).unwrap();
            }
            order.drain_events();

            order.cancel().unwrap();
            assert_eq!(order.status(), OrderStatus::Canceled);

            let events = order.drain_events();
            assert_eq!(events.len(), 1);
            assert_eq!(events[0].name(), "order.canceled");
        }
    }

    #[test]
    fn cancel_after_delivery_is_an_invalid_transition() {
        let mut order = pending_order();
        order.transition(OrderStatus::Confirmed).unwrap();
        order.transition(OrderStatus::Shipped).unwrap();
        order.transition(OrderStatus::Delivered).unwrap();

        let err = order.cancel().unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition(_)));
    }

    #[test]
    fn double_cancel_is_a_conflict_not_an_invalid_transition() {
        let mut order = pending_order();
        order.cancel().unwrap();

        let err = order.cancel().unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(order.status(), OrderStatus::Canceled);
    }

    #[test]
    fn total_holds_after_every_successful_transition() {
        let mut order = pending_order();
        let expected: i64 = order
            .items()
            .iter()
            .map(|i| i64::from(i.quantity) * i.unit_price_cents)
            .sum();

        for status in [OrderStatus::Confirmed, OrderStatus::Shipped, OrderStatus::Delivered] {
            order.transition(status).unwrap();
            assert_eq!(order.total_cents(), expected);
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_items() -> impl Strategy<Value = Vec<NewOrderItem>> {
            proptest::collection::vec((1u32..100, 1i64..100_000), 1..10).prop_map(|pairs| {
                pairs
                    .into_iter()
                    .map(|(quantity, unit_price_cents)| NewOrderItem {
                        product_id: ProductId::new(),
                        quantity,
                        unit_price_cents,
                    })
                    .collect()
            })
        }

        proptest! {
            /// The total always equals the sum over items.
            #[test]
            fn total_is_sum_of_items(items in arb_items()) {
                let order = Order::new(UserId::new(), items.clone()).unwrap();
                let expected: i64 = items
                    .iter()
                    .map(|i| i64::from(i.quantity) * i.unit_price_cents)
                    .sum();
                prop_assert_eq!(order.total_cents(), expected);
            }

            /// Illegal transitions never mutate status; legal ones always do.
            #[test]
            fn transition_respects_the_table(
                path in proptest::collection::vec(0usize..5, 0..12),
            ) {
                let mut order = Order::new(UserId::new(), vec![NewOrderItem {
                    product_id: ProductId::new(),
                    quantity: 1,
                    unit_price_cents: 100,
                }]).unwrap();
                order.drain_events();

                for idx in path {
                    let target = OrderStatus::ALL[idx];
                    let before = order.status();
                    match order.transition(target) {
                        Ok(()) => {
                            prop_assert!(before.can_transition_to(target));
                            prop_assert_eq!(order.status(), target);
                            prop_assert_eq!(order.drain_events().len(), 1);
                        }
                        Err(DomainError::InvalidTransition(_)) => {
                            prop_assert!(!before.can_transition_to(target));
                            prop_assert_eq!(order.status(), before);
                            prop_assert!(order.drain_events().is_empty());
                        }
                        Err(other) => prop_assert!(false, "unexpected error: {other}"),
                    }
                }
            }
        }
    }
}
