//! User domain service.

use std::sync::Arc;

use storefront_core::{DomainError, Page, PageRequest, UserId};
use storefront_events::{EventBus, NoopEventBus};
use storefront_store::UserRepository;
use storefront_users::User;

use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::publish;

/// Operations exposed for the User aggregate.
///
/// Both the base implementation and the caching decorator implement this
/// trait, so either composes behind the same call sites.
pub trait UserService: Send + Sync {
    /// `password_hash` is pre-hashed at the boundary; plaintext never reaches
    /// this layer.
    fn create(&self, email: &str, name: &str, password_hash: &str) -> Result<User, ServiceError>;

    fn update(&self, id: UserId, name: &str) -> Result<User, ServiceError>;

    /// Replace the stored password hash.
    fn update_password(&self, id: UserId, password_hash: &str) -> Result<(), ServiceError>;

    fn delete(&self, id: UserId) -> Result<(), ServiceError>;

    fn get(&self, id: UserId) -> Result<Option<User>, ServiceError>;

    fn get_by_email(&self, email: &str) -> Result<Option<User>, ServiceError>;

    fn list(&self, offset: i64, limit: i64) -> Result<Page<User>, ServiceError>;
}

/// Base implementation backed by a [`UserRepository`].
pub struct DomainUserService {
    repo: Arc<dyn UserRepository>,
    bus: Arc<dyn EventBus>,
    config: ServiceConfig,
}

impl DomainUserService {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        bus: Option<Arc<dyn EventBus>>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            repo,
            bus: bus.unwrap_or_else(|| Arc::new(NoopEventBus::new())),
            config,
        }
    }

    fn publish_events(&self, user: &mut User) {
        publish::publish_all(self.bus.as_ref(), &user.id().to_string(), user.drain_events());
    }
}

impl UserService for DomainUserService {
    #[tracing::instrument(skip_all, fields(user.email = %email))]
    fn create(&self, email: &str, name: &str, password_hash: &str) -> Result<User, ServiceError> {
        // Uniqueness needs a store lookup; check before persisting.
        if self.repo.get_by_email(None, email)?.is_some() {
            return Err(DomainError::conflict("user email is already taken").into());
        }

        let mut user = User::new(email, name, password_hash)?;
        self.repo.create(None, &user)?;

        tracing::info!(user.id = %user.id(), "user created");
        self.publish_events(&mut user);

        Ok(user)
    }

    fn update(&self, id: UserId, name: &str) -> Result<User, ServiceError> {
        let mut user = self
            .repo
            .get_by_id(None, id)?
            .ok_or(DomainError::NotFound)?;

        user.update(name)?;
        self.repo.update(None, &user)?;

        self.publish_events(&mut user);
        Ok(user)
    }

    fn update_password(&self, id: UserId, password_hash: &str) -> Result<(), ServiceError> {
        let mut user = self
            .repo
            .get_by_id(None, id)?
            .ok_or(DomainError::NotFound)?;

        user.update_password(password_hash)?;
        self.repo.update(None, &user)?;

        self.publish_events(&mut user);
        Ok(())
    }

    fn delete(&self, id: UserId) -> Result<(), ServiceError> {
        let mut user = self
            .repo
            .get_by_id(None, id)?
            .ok_or(DomainError::NotFound)?;

        user.mark_deleted();
        self.repo.delete(None, id)?;

        self.publish_events(&mut user);
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(user.id = %id))]
    fn get(&self, id: UserId) -> Result<Option<User>, ServiceError> {
        Ok(self.repo.get_by_id(None, id)?)
    }

    fn get_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        Ok(self.repo.get_by_email(None, email)?)
    }

    fn list(&self, offset: i64, limit: i64) -> Result<Page<User>, ServiceError> {
        let page = PageRequest::clamped(
            offset,
            limit,
            self.config.default_page_size,
            self.config.max_page_size,
        );
        Ok(self.repo.list(None, page)?)
    }
}
