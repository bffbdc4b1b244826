//! Credential store abstraction.
//!
//! Account records for the Reelhub platform live in the platform's document
//! store, which this service talks to through the [`UserStore`] trait. The
//! trait covers exactly the lookups the auth flows need (by username/email,
//! by email, by id) plus account creation. Everything else about accounts
//! (profiles, media preferences, deletion) belongs to other services.
//!
//! Uniqueness of `username` and `email` is ultimately enforced by the store
//! itself: two concurrent registrations can both pass the orchestrator's
//! duplicate pre-check, so `create` must reject the loser with
//! [`StoreError::UniqueViolation`] naming the conflicting field.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::models::users::Role;
use crate::types::UserId;

pub mod memory;

pub use memory::InMemoryUsers;

/// Which unique account attribute a storage-level conflict was detected on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
}

/// Error type for credential store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Unique constraint violation on username or email
    #[error("unique constraint violation on {field:?}: {message}")]
    UniqueViolation { field: UniqueField, message: String },

    /// Catch-all for non-recoverable store errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Type alias for store operation results
pub type Result<T> = std::result::Result<T, StoreError>;

/// An account record as returned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to create a new account.
#[derive(Debug, Clone)]
pub struct UserCreateRequest {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<Role>,
}

/// Access to account records, keyed by the attributes the auth flows use.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Combined lookup used by the registration duplicate pre-check: returns
    /// an account matching on username OR email, if any exists.
    async fn find_by_username_or_email(&self, username: &str, email: &str) -> Result<Option<UserRecord>>;

    /// Look up an account by email (login path).
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    /// Look up an account by id (refresh path).
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>>;

    /// Create a new account, enforcing username/email uniqueness atomically.
    async fn create(&self, request: &UserCreateRequest) -> Result<UserRecord>;
}
