//! Token issuance and verification.
//!
//! Two token classes share one claims shape: short-lived access tokens
//! returned to the caller, and long-lived renewal tokens delivered only via
//! the hardened session cookie. Both are HS256 JWTs signed with the
//! server-held secret; verification is stateless and consults nothing but
//! the secret and the token's own content. Rotating the secret implicitly
//! invalidates every outstanding token.
//!
//! The secret is injected at construction, so tests can run the issuer
//! against fixed secrets without touching process-wide state.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::api::models::users::Role;
use crate::config::Config;
use crate::errors::Error;
use crate::store::UserRecord;
use crate::types::UserId;

/// Claims carried by both token classes.
///
/// Built fresh from the account record at every issuance, so they can go
/// stale relative to later account changes until the next issuance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: UserId,      // Account id
    pub username: String, // Username at issuance time
    pub roles: Vec<Role>, // Role claims at issuance time
    pub exp: i64,         // Expiration time
    pub iat: i64,         // Issued at
}

/// Why a token failed verification.
///
/// Everything that is not an expiry is collapsed into `Invalid`: callers
/// must not be able to distinguish a bad signature from a malformed token.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token invalid")]
    Invalid,
}

/// Signs and verifies session tokens against a fixed secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let secret = config.secret_key.as_ref().ok_or_else(|| Error::Internal {
            operation: "token issuer: secret_key is required".to_string(),
        })?;

        Ok(Self::new(
            secret,
            config.auth.tokens.access_token_ttl,
            config.auth.tokens.refresh_token_ttl,
        ))
    }

    /// Sign a token for `user` expiring `ttl` from now.
    pub fn sign(&self, user: &UserRecord, ttl: Duration) -> Result<String, Error> {
        let now = Utc::now();
        let ttl = chrono::Duration::from_std(ttl).map_err(|e| Error::Internal {
            operation: format!("token ttl out of range: {e}"),
        })?;

        let claims = SessionClaims {
            sub: user.id,
            username: user.username.clone(),
            roles: user.roles.clone(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| Error::Internal {
            operation: format!("sign token: {e}"),
        })
    }

    /// Sign a short-lived access token (returned in response bodies).
    pub fn issue_access_token(&self, user: &UserRecord) -> Result<String, Error> {
        self.sign(user, self.access_ttl)
    }

    /// Sign a long-lived renewal token (delivered only via the cookie).
    pub fn issue_refresh_token(&self, user: &UserRecord) -> Result<String, Error> {
        self.sign(user, self.refresh_ttl)
    }

    /// Verify a token and return its claims.
    ///
    /// Signature is checked before expiry, so a token signed with a
    /// different secret is always `Invalid`, never `Expired`.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let validation = Validation::default();

        match decode::<SessionClaims>(token, &self.decoding_key, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => Err(TokenError::Expired),
                _ => Err(TokenError::Invalid),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    const ACCESS_TTL: Duration = Duration::from_secs(15 * 60);
    const REFRESH_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

    fn issuer(secret: &str) -> TokenIssuer {
        TokenIssuer::new(secret, ACCESS_TTL, REFRESH_TTL)
    }

    fn test_user() -> UserRecord {
        UserRecord {
            id: Uuid::new_v4(),
            username: "testuser".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "$argon2id$fake".to_string(),
            roles: vec![Role::StandardUser],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_sign_and_verify_roundtrip() {
        let issuer = issuer("test-secret");
        let user = test_user();

        let token = issuer.issue_access_token(&user).unwrap();
        let claims = issuer.verify(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, user.username);
        assert_eq!(claims.roles, user.roles);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_refresh_token_outlives_access_token() {
        let issuer = issuer("test-secret");
        let user = test_user();

        let access = issuer.verify(&issuer.issue_access_token(&user).unwrap()).unwrap();
        let refresh = issuer.verify(&issuer.issue_refresh_token(&user).unwrap()).unwrap();

        assert!(refresh.exp > access.exp);
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let user = test_user();
        let token = issuer("secret-a").sign(&user, ACCESS_TTL).unwrap();

        assert_eq!(issuer("secret-b").verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_wrong_secret_beats_expiry() {
        // Expired token signed with a different secret: the signature check
        // runs first, so the failure is Invalid rather than Expired.
        let user = test_user();
        let token = encode_expired("secret-a", &user);

        assert_eq!(issuer("secret-b").verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_expired_token() {
        let user = test_user();
        let token = encode_expired("test-secret", &user);

        assert_eq!(issuer("test-secret").verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_malformed_tokens_are_invalid() {
        let issuer = issuer("test-secret");

        for token in ["", "invalid", "not.a.token", "too.many.parts.in.this.token"] {
            assert_eq!(issuer.verify(token), Err(TokenError::Invalid), "token: {token:?}");
        }
    }

    /// Encode a token whose expiry is well past (beyond validation leeway).
    fn encode_expired(secret: &str, user: &UserRecord) -> String {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user.id,
            username: user.username.clone(),
            roles: user.roles.clone(),
            exp: (now - chrono::Duration::hours(2)).timestamp(),
            iat: (now - chrono::Duration::hours(3)).timestamp(),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }
}
