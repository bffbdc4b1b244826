//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: axum route handlers for the auth endpoints
//! - **[`models`]**: request/response structures defining the wire contract
//!
//! All endpoints carry OpenAPI annotations via `utoipa`; the rendered docs
//! are served at `/docs` when the server is running.

use utoipa::OpenApi;

pub mod handlers;
pub mod models;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::refresh,
        handlers::auth::session_info,
        handlers::health,
    ),
    components(schemas(
        models::auth::RegisterRequest,
        models::auth::LoginRequest,
        models::auth::MessageResponse,
        models::auth::TokenResponse,
        models::auth::SessionInfoResponse,
        models::users::Role,
    )),
    tags(
        (name = "authentication", description = "Account registration and session management"),
        (name = "system", description = "Operational endpoints"),
    )
)]
pub struct ApiDoc;
