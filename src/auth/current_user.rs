//! Extractor for the authenticated caller.
//!
//! Verifies the `Authorization: Bearer <access token>` header against the
//! token issuer and hands the verified claims to the handler. Only identity
//! is established here - what a caller is allowed to do with it is enforced
//! by the services consuming the claims, not by this subsystem.

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::instrument;

use crate::{AppState, auth::token::SessionClaims, errors::Error};

/// The verified claims of the caller's access token.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub SessionClaims);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(Error::Unauthenticated { message: None })?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or(Error::Unauthenticated { message: None })?;

        // Expired and invalid access tokens both just mean "not
        // authenticated" to the caller; re-login or refresh fixes either.
        let claims = state.auth.tokens().verify(token).map_err(|_| Error::Unauthenticated {
            message: Some("Invalid or expired access token".to_string()),
        })?;

        Ok(CurrentUser(claims))
    }
}
