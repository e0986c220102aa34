use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, Entity, UserId};
use storefront_events::DomainEvent;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

/// Aggregate root: User.
///
/// Constructed via the validating [`User::new`] factory; mutated only through
/// named methods that re-validate and append exactly one event each.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    email: String,
    name: String,
    /// Pre-hashed at the boundary; the aggregate never sees plaintext.
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,

    #[serde(skip)]
    events: Vec<UserEvent>,
}

impl User {
    /// Validating factory. Fails fast, producing no partial object.
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> DomainResult<Self> {
        let now = Utc::now();
        let mut user = Self {
            id: UserId::new(),
            email: email.into(),
            name: name.into(),
            password_hash: password_hash.into(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
            events: Vec::new(),
        };

        user.validate()?;

        user.record(UserEvent::Created {
            email: user.email.clone(),
            name: user.name.clone(),
        });

        Ok(user)
    }

    fn validate(&self) -> DomainResult<()> {
        if self.email.is_empty() {
            return Err(DomainError::validation("user email is required"));
        }
        if !EMAIL_RE.is_match(&self.email) {
            return Err(DomainError::validation("user email is invalid"));
        }
        if self.name.is_empty() {
            return Err(DomainError::validation("user name is required"));
        }
        if self.password_hash.is_empty() {
            return Err(DomainError::validation("user password is required"));
        }
        Ok(())
    }

    /// Rename the user.
    pub fn update(&mut self, name: impl Into<String>) -> DomainResult<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(DomainError::validation("user name is required"));
        }

        self.name = name.clone();
        self.updated_at = Utc::now();

        self.record(UserEvent::Updated { id: self.id, name });
        Ok(())
    }

    /// Replace the stored password hash.
    pub fn update_password(&mut self, password_hash: impl Into<String>) -> DomainResult<()> {
        let password_hash = password_hash.into();
        if password_hash.is_empty() {
            return Err(DomainError::validation("user password is required"));
        }

        self.password_hash = password_hash;
        self.updated_at = Utc::now();

        self.record(UserEvent::Updated {
            id: self.id,
            name: self.name.clone(),
        });
        Ok(())
    }

    /// Soft delete.
    pub fn mark_deleted(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;

        self.record(UserEvent::Deleted { id: self.id });
    }

    /// Return the pending events and clear the buffer.
    ///
    /// An event drained once is never re-emitted.
    pub fn drain_events(&mut self) -> Vec<UserEvent> {
        std::mem::take(&mut self.events)
    }

    fn record(&mut self, event: UserEvent) {
        self.events.push(event);
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
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

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// User domain events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UserEvent {
    Created { email: String, name: String },
    Updated { id: UserId, name: String },
    Deleted { id: UserId },
}

impl DomainEvent for UserEvent {
    fn name(&self) -> &'static str {
        match self {
            UserEvent::Created { .. } => "user.created",
            UserEvent::Updated { .. } => "user.updated",
            UserEvent::Deleted { .. } => "user.deleted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_user() -> User {
        User::new("a@b.com", "A", "secret1").unwrap()
    }

    #[test]
    fn new_user_records_created_event() {
        let mut user = valid_user();
        let events = user.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name(), "user.created");
    }

    #[test]
    fn drained_events_are_not_re_emitted() {
        let mut user = valid_user();
        assert_eq!(user.drain_events().len(), 1);
        assert!(user.drain_events().is_empty());
    }

    #[test]
    fn rejects_empty_email() {
        let err = User::new("", "A", "secret1").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn rejects_malformed_email() {
        for email in ["not-an-email", "a@b", "@b.com", "a b@c.com"] {
            let err = User::new(email, "A", "secret1").unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)), "{email}");
        }
    }

    #[test]
    fn rejects_empty_name_and_password() {
        assert!(User::new("a@b.com", "", "secret1").is_err());
        assert!(User::new("a@b.com", "A", "").is_err());
    }

    #[test]
    fn update_renames_and_records_event() {
        let mut user = valid_user();
        user.drain_events();

        user.update("B").unwrap();
        assert_eq!(user.name(), "B");

        let events = user.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name(), "user.updated");
    }

    #[test]
    fn update_with_empty_name_leaves_user_unchanged() {
        let mut user = valid_user();
        user.drain_events();

        let err = user.update("").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(user.name(), "A");
        assert!(user.drain_events().is_empty());
    }

    #[test]
    fn mark_deleted_sets_marker_and_records_event() {
        let mut user = valid_user();
        user.drain_events();

        user.mark_deleted();
        assert!(user.is_deleted());

        let events = user.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name(), "user.deleted");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Every accepted construction yields exactly one created event
            /// and the supplied attributes unchanged.
            #[test]
            fn valid_input_yields_one_created_event(
                local in "[a-z0-9]{1,12}",
                domain in "[a-z0-9]{1,12}",
                name in "[A-Za-z][A-Za-z0-9 ]{0,30}",
                password in "[a-zA-Z0-9]{6,20}",
            ) {
                let email = format!("{local}@{domain}.com");
                let mut user = User::new(email.clone(), name.clone(), password).unwrap();
                prop_assert_eq!(user.email(), email.as_str());
                prop_assert_eq!(user.name(), name.as_str());
                prop_assert_eq!(user.drain_events().len(), 1);
            }
        }
    }
}
