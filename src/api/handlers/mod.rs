//! Axum route handlers.

pub mod auth;

/// Liveness probe for deployment health checks.
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health() -> &'static str {
    "ok"
}
