//! The auth orchestrator: register, login, logout, refresh.
//!
//! Each operation is an atomic sequence - the first failing step
//! short-circuits with a classified [`Error`] and nothing is committed.
//! Operations take and return plain values (token strings, cookie presence);
//! reading and writing the actual cookie is the transport layer's job, which
//! keeps this type testable without a live server.
//!
//! There is no cross-request session object and no revocation ledger:
//! sessions are validated purely by signature and expiry, so logout only
//! removes the client-held cookie and a copied renewal token stays valid
//! until its natural expiry. That statelessness is a deliberate choice
//! inherited from the platform design, not an oversight.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::api::models::users::Role;
use crate::auth::password::{self, Argon2Params};
use crate::auth::token::{TokenError, TokenIssuer};
use crate::config::AuthConfig;
use crate::errors::{Error, Result};
use crate::store::{StoreError, UniqueField, UserCreateRequest, UserStore};
use crate::types::abbrev_uuid;

/// Token pair produced by a successful login.
///
/// The access token goes into the response body; the refresh token must only
/// ever reach the client through the renewal cookie.
#[derive(Debug)]
pub struct LoginTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// What the transport layer should do with the renewal cookie after logout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    /// A session cookie was presented: instruct the browser to clear it.
    ClearedSession,
    /// No cookie was presented: already logged out, nothing to do.
    NoSession,
}

/// Sequences the password hasher, token issuer, and credential store into
/// the four auth operations.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    tokens: TokenIssuer,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, tokens: TokenIssuer, config: AuthConfig) -> Self {
        Self { store, tokens, config }
    }

    /// Create a new account. No token is issued at registration time; the
    /// user logs in separately.
    #[instrument(skip_all, fields(username = %username))]
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<&'static str> {
        if !self.config.allow_registration {
            return Err(Error::BadRequest {
                message: "User registration is disabled".to_string(),
            });
        }

        let rules = &self.config.password;
        // Character count, not byte count: the rules are user-facing.
        let length = password.chars().count();
        if length < rules.min_length {
            return Err(Error::BadRequest {
                message: format!("Password must be at least {} characters", rules.min_length),
            });
        }
        if length > rules.max_length {
            return Err(Error::BadRequest {
                message: format!("Password must be no more than {} characters", rules.max_length),
            });
        }

        // Duplicate pre-check: one combined query, username collision
        // reported before email collision.
        if let Some(existing) = self.store.find_by_username_or_email(username, email).await? {
            if existing.username == username {
                return Err(Error::DuplicateUsername);
            }
            return Err(Error::DuplicateEmail);
        }

        // Hash on a blocking thread to avoid stalling the async runtime
        let password_hash = self.hash_password(password.to_string()).await?;

        let create_request = UserCreateRequest {
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            roles: vec![Role::StandardUser],
        };

        // Two registrations can race past the pre-check; the store's own
        // uniqueness constraint decides the loser, which gets the same
        // duplicate classification as the pre-check would have produced.
        let user = self.store.create(&create_request).await.map_err(|e| match e {
            StoreError::UniqueViolation {
                field: UniqueField::Username,
                ..
            } => Error::DuplicateUsername,
            StoreError::UniqueViolation {
                field: UniqueField::Email,
                ..
            } => Error::DuplicateEmail,
            other => Error::Store(other),
        })?;

        info!(user_id = %abbrev_uuid(&user.id), "user registration completed");

        Ok("Your registration is complete. You can now log in.")
    }

    /// Authenticate credentials and issue both token classes.
    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginTokens> {
        let user = self.store.find_by_email(email).await?.ok_or(Error::UserNotFound)?;

        let hash = user.password_hash.clone();
        let password = password.to_string();
        let matches = tokio::task::spawn_blocking(move || password::verify_string(&password, &hash))
            .await
            .map_err(|e| Error::Internal {
                operation: format!("spawn password verification task: {e}"),
            })?;

        if !matches {
            return Err(Error::InvalidCredential);
        }

        let access_token = self.tokens.issue_access_token(&user)?;
        let refresh_token = self.tokens.issue_refresh_token(&user)?;

        info!(user_id = %abbrev_uuid(&user.id), "login succeeded");

        Ok(LoginTokens {
            access_token,
            refresh_token,
        })
    }

    /// End the session. Idempotent: logging out without a session cookie is
    /// a success, not an error.
    #[instrument(skip_all)]
    pub fn logout(&self, refresh_cookie: Option<&str>) -> LogoutOutcome {
        match refresh_cookie {
            Some(_) => {
                info!("logout: clearing session cookie");
                LogoutOutcome::ClearedSession
            }
            None => LogoutOutcome::NoSession,
        }
    }

    /// Exchange a valid renewal token for a fresh access token.
    ///
    /// Claims are rebuilt from the *current* account state, so role changes
    /// since the renewal token was issued take effect here. The renewal
    /// token itself is not rotated.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_cookie: Option<&str>) -> Result<String> {
        let token = refresh_cookie.ok_or(Error::MissingSession)?;

        let claims = self.tokens.verify(token).map_err(|e| match e {
            TokenError::Expired => Error::SessionExpired,
            TokenError::Invalid => Error::SessionInvalid,
        })?;

        // A deleted account is indistinguishable from a tampered token on
        // purpose: both surface as SessionInvalid.
        let user = self.store.find_by_id(claims.sub).await?.ok_or(Error::SessionInvalid)?;

        let access_token = self.tokens.issue_access_token(&user)?;

        info!(user_id = %abbrev_uuid(&user.id), "session refreshed");

        Ok(access_token)
    }

    /// Hash a plaintext password on a blocking thread with the configured
    /// Argon2 cost parameters.
    pub(crate) async fn hash_password(&self, password: String) -> Result<String> {
        let params = Argon2Params::from(&self.config.password);
        tokio::task::spawn_blocking(move || password::hash_string_with_params(&password, Some(params)))
            .await
            .map_err(|e| Error::Internal {
                operation: format!("spawn password hashing task: {e}"),
            })?
    }

    pub(crate) fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    pub(crate) fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }
}
