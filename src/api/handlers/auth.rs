//! HTTP handlers for the auth endpoints.
//!
//! The handlers are deliberately thin: they move the renewal cookie between
//! the transport and the orchestrator, which itself only sees plain values.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    api::models::auth::{
        LoginRequest, LoginResponse, LogoutResponse, MessageResponse, RegisterRequest, SessionInfoResponse, TokenResponse,
    },
    auth::{current_user::CurrentUser, service::LogoutOutcome},
    errors::Error,
};

/// Register a new account
#[utoipa::path(
    post,
    path = "/authentication/register",
    request_body = RegisterRequest,
    tag = "authentication",
    responses(
        (status = 201, description = "Account registered successfully", body = MessageResponse),
        (status = 400, description = "Duplicate username/email or invalid input"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), Error> {
    let message = state
        .auth
        .register(&request.username, &request.email, &request.password)
        .await?;

    Ok((StatusCode::CREATED, Json(MessageResponse::new(message))))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/authentication/login",
    request_body = LoginRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 404, description = "Unknown account"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<LoginResponse, Error> {
    let tokens = state.auth.login(&request.email, &request.password).await?;

    // Access token in the body; renewal token only ever in the cookie.
    let cookie = state.cookies.set(&tokens.refresh_token);

    Ok(LoginResponse {
        tokens: TokenResponse {
            access_token: tokens.access_token,
        },
        cookie,
    })
}

/// Logout (clear the renewal cookie)
#[utoipa::path(
    post,
    path = "/authentication/logout",
    tag = "authentication",
    responses(
        (status = 200, description = "Logged out, or no session existed", body = MessageResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, Error> {
    let refresh_cookie = state.cookies.read(&headers);

    match state.auth.logout(refresh_cookie.as_deref()) {
        LogoutOutcome::NoSession => Ok(StatusCode::OK.into_response()),
        LogoutOutcome::ClearedSession => Ok(LogoutResponse {
            message: MessageResponse::new("You have successfully logged out."),
            cookie: state.cookies.clear(),
        }
        .into_response()),
    }
}

/// Exchange the renewal cookie for a fresh access token
#[utoipa::path(
    post,
    path = "/authentication/refresh",
    tag = "authentication",
    responses(
        (status = 200, description = "Fresh access token issued", body = TokenResponse),
        (status = 401, description = "No renewal cookie present"),
        (status = 403, description = "Renewal token expired or invalid"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn refresh(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<TokenResponse>, Error> {
    let refresh_cookie = state.cookies.read(&headers);

    let access_token = state.auth.refresh(refresh_cookie.as_deref()).await?;

    Ok(Json(TokenResponse { access_token }))
}

/// Identity of the caller's access token
#[utoipa::path(
    get,
    path = "/authentication/session",
    tag = "authentication",
    responses(
        (status = 200, description = "Claims of the presented access token", body = SessionInfoResponse),
        (status = 401, description = "Missing or invalid access token"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn session_info(CurrentUser(claims): CurrentUser) -> Json<SessionInfoResponse> {
    Json(SessionInfoResponse::from(claims))
}
