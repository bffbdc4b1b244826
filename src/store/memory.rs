//! In-process credential store.
//!
//! Backs the test suite and standalone deployments. Accounts live in a
//! `HashMap` behind a `tokio::sync::RwLock`; the write lock makes the
//! uniqueness check and the insert in [`InMemoryUsers::create`] a single
//! atomic step, which is what closes the concurrent-registration race the
//! orchestrator's pre-check alone cannot.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::instrument;
use uuid::Uuid;

use super::{Result, StoreError, UniqueField, UserCreateRequest, UserRecord, UserStore};
use crate::types::{UserId, abbrev_uuid};

/// In-memory [`UserStore`] implementation.
#[derive(Debug, Default)]
pub struct InMemoryUsers {
    users: RwLock<HashMap<UserId, UserRecord>>,
}

impl InMemoryUsers {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryUsers {
    #[instrument(skip(self), err)]
    async fn find_by_username_or_email(&self, username: &str, email: &str) -> Result<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.username == username || u.email == email)
            .cloned())
    }

    #[instrument(skip(self), err)]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    #[instrument(skip(self, request), fields(username = %request.username), err)]
    async fn create(&self, request: &UserCreateRequest) -> Result<UserRecord> {
        let mut users = self.users.write().await;

        // Username conflict is reported before email conflict, matching the
        // orchestrator's pre-check ordering.
        if users.values().any(|u| u.username == request.username) {
            return Err(StoreError::UniqueViolation {
                field: UniqueField::Username,
                message: format!("username {:?} already exists", request.username),
            });
        }
        if users.values().any(|u| u.email == request.email) {
            return Err(StoreError::UniqueViolation {
                field: UniqueField::Email,
                message: format!("email {:?} already exists", request.email),
            });
        }

        let record = UserRecord {
            id: Uuid::new_v4(),
            username: request.username.clone(),
            email: request.email.clone(),
            password_hash: request.password_hash.clone(),
            roles: request.roles.clone(),
            created_at: Utc::now(),
        };
        users.insert(record.id, record.clone());

        Ok(record)
    }
}
