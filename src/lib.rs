//! # reelhub-auth: Authentication for the Reelhub media platform
//!
//! `reelhub-auth` is the authentication and session service of the Reelhub
//! backend. It authenticates account credentials, issues time-bounded access
//! tokens, manages a long-lived renewal credential delivered via a hardened
//! cookie, and terminates sessions. The media catalogue, profile, and upload
//! services consume the access tokens it issues; they are separate services
//! and never appear here.
//!
//! ## Request Flow
//!
//! A browser client logs in at `/authentication/login` with email and
//! password. On success it receives a 15-minute access token in the response
//! body and a 7-day renewal token in an `HttpOnly; Secure; SameSite=None`
//! cookie named `jwt` (the client and API live on different origins, hence
//! the cross-site flags). When the access token lapses, the client calls
//! `/authentication/refresh`; the renewal cookie is verified and a fresh
//! access token is minted from the account's *current* state, so role
//! changes take effect at the next refresh. Logout clears the cookie.
//!
//! Sessions are fully stateless: no token is recorded server-side and there
//! is no revocation list, so validity is decided by signature and expiry
//! alone. Rotating the signing secret invalidates every outstanding token at
//! once.
//!
//! ## Core Components
//!
//! The **auth layer** ([`auth`]) holds the password hasher (Argon2id), the
//! token issuer (HS256 JWTs for both token classes), the renewal-cookie
//! manager, and the orchestrator sequencing them into the four operations.
//!
//! The **store layer** ([`store`]) abstracts the platform's document store
//! behind the `UserStore` trait; the service itself only ever looks up
//! accounts by username/email/id and creates them at registration.
//!
//! The **API layer** ([`api`]) exposes the operations over axum with
//! OpenAPI annotations, translating classified failures into HTTP statuses
//! through [`errors::Error`].

use std::sync::Arc;

use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use bon::Builder;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod store;
pub mod telemetry;
#[cfg(test)]
pub mod test_utils;
pub mod types;

pub use config::Config;

use crate::api::ApiDoc;
use crate::api::models::users::Role;
use crate::auth::cookie::SessionCookies;
use crate::auth::service::AuthService;
use crate::auth::token::TokenIssuer;
use crate::errors::Error;
use crate::store::{InMemoryUsers, UserCreateRequest, UserStore};
use crate::types::UserId;

/// Shared state for all request handlers.
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub auth: AuthService,
    pub cookies: SessionCookies,
}

impl AppState {
    /// Wire the auth components up from a config and a credential store.
    pub fn from_parts(config: Config, store: Arc<dyn UserStore>) -> Result<Self, Error> {
        let tokens = TokenIssuer::from_config(&config)?;
        let cookies = SessionCookies::from_config(&config);
        let auth = AuthService::new(store, tokens, config.auth.clone());

        Ok(AppState::builder().config(config).auth(auth).cookies(cookies).build())
    }
}

/// Create the initial admin account if it doesn't exist.
///
/// Idempotent: an existing account with the configured email is left
/// untouched. Called during startup so a fresh deployment always has an
/// admin to log in with.
#[instrument(skip_all)]
pub async fn create_initial_admin_user(email: &str, password: &str, auth: &AuthService) -> Result<UserId, Error> {
    if let Some(existing) = auth.store().find_by_email(email).await? {
        return Ok(existing.id);
    }

    let password_hash = auth.hash_password(password.to_string()).await?;
    let created = auth
        .store()
        .create(&UserCreateRequest {
            username: email.to_string(),
            email: email.to_string(),
            password_hash,
            roles: vec![Role::Admin],
        })
        .await?;

    info!("created initial admin account");
    Ok(created.id)
}

/// Create CORS layer from configuration.
///
/// Credentials must be allowed: the renewal cookie rides on cross-origin
/// requests from the web client.
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.cors.allowed_origins {
        // Serialize the origin itself; Url::as_str() would append a
        // trailing slash that never matches an Origin header.
        origins.push(origin.origin().ascii_serialization().parse::<HeaderValue>()?);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(config.cors.allow_credentials)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE, axum::http::header::AUTHORIZATION]);

    if let Some(max_age) = config.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let auth_routes = Router::new()
        .route("/authentication/register", post(api::handlers::auth::register))
        .route("/authentication/login", post(api::handlers::auth::login))
        .route("/authentication/logout", post(api::handlers::auth::logout))
        .route("/authentication/refresh", post(api::handlers::auth::refresh))
        .route("/authentication/session", get(api::handlers::auth::session_info))
        .with_state(state.clone());

    let router = Router::new()
        .route("/health", get(api::handlers::health))
        .merge(auth_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    let cors_layer = create_cors_layer(&state.config)?;

    let router = router.layer(cors_layer).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// The assembled application, ready to serve.
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application instance with all components wired up.
    ///
    /// Runs against the in-process store; a deployment embedding this crate
    /// substitutes the platform's document-store adapter via
    /// [`Application::with_store`].
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::with_store(config, Arc::new(InMemoryUsers::new())).await
    }

    /// Create an application instance on top of an existing credential store.
    pub async fn with_store(config: Config, store: Arc<dyn UserStore>) -> anyhow::Result<Self> {
        let state = AppState::from_parts(config.clone(), store)?;

        if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
            create_initial_admin_user(email, password, &state.auth).await?;
        }

        let router = build_router(state)?;

        Ok(Self { router, config })
    }

    /// Start serving the application.
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("Auth service listening on http://{}", bind_addr);

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_config, create_test_server, state_with_config};

    #[test_log::test(tokio::test)]
    async fn test_health_endpoint() {
        let server = create_test_server();
        let response = server.get("/health").await;
        response.assert_status_ok();
        assert_eq!(response.text(), "ok");
    }

    #[tokio::test]
    async fn test_initial_admin_is_idempotent() {
        let state = state_with_config(create_test_config());

        let first = create_initial_admin_user("admin@reelhub.example", "admin-password", &state.auth)
            .await
            .unwrap();
        let second = create_initial_admin_user("admin@reelhub.example", "admin-password", &state.auth)
            .await
            .unwrap();

        assert_eq!(first, second);

        let record = state.auth.store().find_by_id(first).await.unwrap().unwrap();
        assert_eq!(record.roles, vec![Role::Admin]);
    }

    #[test]
    fn test_state_requires_secret_key() {
        let config = Config::default();
        let result = AppState::from_parts(config, Arc::new(InMemoryUsers::new()));
        assert!(result.is_err());
    }
}
