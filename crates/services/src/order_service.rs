//! Order domain service.
//!
//! Order creation is the one multi-row write in the system (order header
//! plus items), so it runs inside an explicit relational transaction.

use std::sync::Arc;

use storefront_core::{DomainError, OrderId, Page, PageRequest, UserId};
use storefront_events::{EventBus, NoopEventBus};
use storefront_orders::{NewOrderItem, Order, OrderStatus};
use storefront_store::{OrderRepository, StoreKind, TransactionFactory, UserRepository};

use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::publish;

/// Operations exposed for the Order aggregate.
pub trait OrderService: Send + Sync {
    fn create(&self, user_id: UserId, items: Vec<NewOrderItem>) -> Result<Order, ServiceError>;

    fn get(&self, id: OrderId) -> Result<Option<Order>, ServiceError>;

    fn get_by_user_id(
        &self,
        user_id: UserId,
        offset: i64,
        limit: i64,
    ) -> Result<Page<Order>, ServiceError>;

    fn list(&self, offset: i64, limit: i64) -> Result<Page<Order>, ServiceError>;

    /// Drive the order through its status state machine.
    fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<Order, ServiceError>;

    fn cancel(&self, id: OrderId) -> Result<Order, ServiceError>;

    fn delete(&self, id: OrderId) -> Result<(), ServiceError>;
}

/// Base implementation backed by an [`OrderRepository`].
pub struct DomainOrderService {
    repo: Arc<dyn OrderRepository>,
    user_repo: Arc<dyn UserRepository>,
    tx_factory: Arc<dyn TransactionFactory>,
    bus: Arc<dyn EventBus>,
    config: ServiceConfig,
}

impl DomainOrderService {
    pub fn new(
        repo: Arc<dyn OrderRepository>,
        user_repo: Arc<dyn UserRepository>,
        tx_factory: Arc<dyn TransactionFactory>,
        bus: Option<Arc<dyn EventBus>>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            repo,
            user_repo,
            tx_factory,
            bus: bus.unwrap_or_else(|| Arc::new(NoopEventBus::new())),
            config,
        }
    }

    fn publish_events(&self, order: &mut Order) {
        publish::publish_all(
            self.bus.as_ref(),
            &order.id().to_string(),
            order.drain_events(),
        );
    }

    fn load(&self, id: OrderId) -> Result<Order, ServiceError> {
        self.repo
            .get_by_id(None, id)?
            .ok_or(DomainError::NotFound)
            .map_err(Into::into)
    }
}

impl OrderService for DomainOrderService {
    #[tracing::instrument(skip_all, fields(order.user_id = %user_id))]
    fn create(&self, user_id: UserId, items: Vec<NewOrderItem>) -> Result<Order, ServiceError> {
        if self.user_repo.get_by_id(None, user_id)?.is_none() {
            return Err(DomainError::NotFound.into());
        }

        let mut order = Order::new(user_id, items)?;

        let tx = self.tx_factory.begin(StoreKind::Relational)?;
        match self.repo.create(Some(&tx), &order) {
            Ok(()) => tx.commit()?,
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    tracing::warn!(error = %rollback_err, "order create rollback failed");
                }
                return Err(err.into());
            }
        }

        tracing::info!(order.id = %order.id(), order.total_cents = order.total_cents(), "order created");
        self.publish_events(&mut order);

        Ok(order)
    }

    fn get(&self, id: OrderId) -> Result<Option<Order>, ServiceError> {
        Ok(self.repo.get_by_id(None, id)?)
    }

    fn get_by_user_id(
        &self,
        user_id: UserId,
        offset: i64,
        limit: i64,
    ) -> Result<Page<Order>, ServiceError> {
        let page = PageRequest::clamped(
            offset,
            limit,
            self.config.default_page_size,
            self.config.max_page_size,
        );
        Ok(self.repo.get_by_user_id(None, user_id, page)?)
    }

    fn list(&self, offset: i64, limit: i64) -> Result<Page<Order>, ServiceError> {
        let page = PageRequest::clamped(
            offset,
            limit,
            self.config.default_page_size,
            self.config.max_page_size,
        );
        Ok(self.repo.list(None, page)?)
    }

    #[tracing::instrument(skip(self), fields(order.id = %id, order.target = %status))]
    fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<Order, ServiceError> {
        let mut order = self.load(id)?;

        // Cancellation has its own semantics (double-cancel is a conflict,
        // not an illegal transition), so route it through cancel.
        if status == OrderStatus::Canceled {
            order.cancel()?;
        } else {
            order.transition(status)?;
        }

        self.repo.update_status(None, id, status)?;
        self.publish_events(&mut order);

        Ok(order)
    }

    fn cancel(&self, id: OrderId) -> Result<Order, ServiceError> {
        let mut order = self.load(id)?;

        order.cancel()?;
        self.repo.update_status(None, id, OrderStatus::Canceled)?;

        self.publish_events(&mut order);
        Ok(order)
    }

    fn delete(&self, id: OrderId) -> Result<(), ServiceError> {
        let mut order = self.load(id)?;

        order.mark_deleted();
        self.repo.delete(None, id)?;

        self.publish_events(&mut order);
        Ok(())
    }
}
