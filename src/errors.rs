//! Classified error taxonomy for the auth flows.
//!
//! Every failure the orchestrator can produce is a variant here, returned as
//! an explicit `Result` value and mapped to an HTTP status at the boundary
//! via [`IntoResponse`]. Nothing in this module retries: all classified
//! failures are caused by invalid input or invalid state, not transient
//! conditions.
//!
//! `UserNotFound` and `InvalidCredential` deliberately share one generic
//! user-facing message so responses do not confirm which accounts exist or
//! which half of a credential pair was wrong. `SessionInvalid` likewise does
//! not distinguish a tampered token from a deleted account.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

use crate::store::StoreError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Registration collision on the username field
    #[error("username already registered")]
    DuplicateUsername,

    /// Registration collision on the email field
    #[error("email already registered")]
    DuplicateEmail,

    /// Login email has no matching account
    #[error("no account for login email")]
    UserNotFound,

    /// Password mismatch on login
    #[error("password mismatch")]
    InvalidCredential,

    /// Request requires a bearer access token that is missing or unverifiable
    #[error("not authenticated")]
    Unauthenticated { message: Option<String> },

    /// Refresh attempted with no renewal cookie
    #[error("no renewal session cookie present")]
    MissingSession,

    /// Renewal token expiry has passed
    #[error("renewal token expired")]
    SessionExpired,

    /// Signature mismatch, malformed token, or referenced account gone
    #[error("renewal token could not be verified")]
    SessionInvalid,

    /// Invalid request data (e.g. password length out of bounds)
    #[error("{message}")]
    BadRequest { message: String },

    /// Credential store failure the auth flows cannot classify further
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Generic internal service error
    #[error("failed to {operation}")]
    Internal { operation: String },

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::DuplicateUsername | Error::DuplicateEmail => StatusCode::BAD_REQUEST,
            Error::UserNotFound => StatusCode::NOT_FOUND,
            Error::InvalidCredential | Error::MissingSession | Error::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Error::SessionExpired | Error::SessionInvalid => StatusCode::FORBIDDEN,
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::Store(_) | Error::Internal { .. } | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal details
    /// or account-existence information.
    pub fn user_message(&self) -> String {
        match self {
            Error::DuplicateUsername => "This username is already in use. Please choose another username.".to_string(),
            Error::DuplicateEmail => {
                "This email address is already registered. Please use a different email address.".to_string()
            }
            // Same phrasing for both so the response does not reveal whether
            // the email or the password was wrong.
            Error::UserNotFound | Error::InvalidCredential => "Invalid email or password".to_string(),
            Error::Unauthenticated { message } => {
                message.clone().unwrap_or_else(|| "Authentication required".to_string())
            }
            Error::MissingSession => "No active session was found. Please log in again.".to_string(),
            Error::SessionExpired => "Your session has expired. Please log in again.".to_string(),
            Error::SessionInvalid => "Your session could not be verified. Please log in again.".to_string(),
            Error::BadRequest { message } => message.clone(),
            Error::Store(_) | Error::Internal { .. } | Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full details server-side; the operation context comes from the
        // surrounding #[instrument] spans. Plaintext credentials and token
        // contents never appear in these messages.
        match &self {
            Error::Store(_) | Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::DuplicateUsername | Error::DuplicateEmail | Error::BadRequest { .. } => {
                tracing::debug!("Client error: {}", self);
            }
            Error::UserNotFound
            | Error::InvalidCredential
            | Error::Unauthenticated { .. }
            | Error::MissingSession
            | Error::SessionExpired
            | Error::SessionInvalid => {
                tracing::info!("Authentication failure: {}", self);
            }
        }

        (self.status_code(), self.user_message()).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::UniqueField;

    #[test]
    fn test_status_codes_follow_taxonomy() {
        assert_eq!(Error::DuplicateUsername.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::DuplicateEmail.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::UserNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(Error::InvalidCredential.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::MissingSession.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::SessionExpired.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(Error::SessionInvalid.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_not_found_and_bad_password_share_phrasing() {
        assert_eq!(Error::UserNotFound.user_message(), Error::InvalidCredential.user_message());
    }

    #[test]
    fn test_unauthenticated_message_defaults() {
        let bare = Error::Unauthenticated { message: None };
        assert_eq!(bare.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(bare.user_message(), "Authentication required");

        let detailed = Error::Unauthenticated {
            message: Some("Invalid or expired access token".to_string()),
        };
        assert_eq!(detailed.user_message(), "Invalid or expired access token");
    }

    #[test]
    fn test_store_errors_are_internal() {
        let err = Error::Store(StoreError::UniqueViolation {
            field: UniqueField::Email,
            message: "email exists".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.user_message(), "Internal server error");
    }
}
