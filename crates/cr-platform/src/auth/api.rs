//! Auth REST API.

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::shared::api_common::SimpleOk;
use crate::shared::error::{Result, ServiceError};
use crate::shared::middleware::extract_bearer_token;

use super::service::{AuthService, TokenPair};

/// Auth service state
#[derive(Clone)]
pub struct AuthApiState {
    pub auth: Arc<AuthService>,
}

/// Signup request
#[derive(Debug, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Refresh request
#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Password reset request
#[derive(Debug, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub email: String,
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/signup",
    tag = "auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = SimpleOk),
        (status = 400, description = "Signup rejected by the identity provider")
    )
)]
pub async fn signup(
    State(state): State<AuthApiState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SimpleOk>)> {
    let data = state.auth.signup(&payload.email, &payload.password).await?;
    Ok((StatusCode::CREATED, Json(SimpleOk::with_data(data))))
}

/// Exchange credentials for a token pair
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token pair", body = TokenPair),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AuthApiState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenPair>> {
    let tokens = state.auth.login(&payload.email, &payload.password).await?;
    Ok(Json(tokens))
}

/// Revoke the caller's access token
#[utoipa::path(
    post,
    path = "/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Token revoked", body = SimpleOk),
        (status = 401, description = "Missing Authorization header")
    ),
    security(("bearer_auth" = []))
)]
pub async fn logout(
    State(state): State<AuthApiState>,
    headers: HeaderMap,
) -> Result<Json<SimpleOk>> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(extract_bearer_token)
        .ok_or_else(|| ServiceError::unauthenticated("Missing Authorization header"))?;
    state.auth.logout(token).await?;
    Ok(Json(SimpleOk::new()))
}

/// Exchange a refresh token for a fresh token pair
#[utoipa::path(
    post,
    path = "/refresh",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Token pair", body = TokenPair),
        (status = 401, description = "Invalid refresh token")
    )
)]
pub async fn refresh(
    State(state): State<AuthApiState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<TokenPair>> {
    let tokens = state.auth.refresh(&payload.refresh_token).await?;
    Ok(Json(tokens))
}

/// Request a password reset email (stub)
///
/// Accepts and acknowledges the request; no mail delivery is wired up.
#[utoipa::path(
    post,
    path = "/reset-password",
    tag = "auth",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Reset acknowledged", body = SimpleOk),
        (status = 422, description = "Missing email")
    )
)]
pub async fn reset_password(
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<SimpleOk>> {
    if payload.email.is_empty() {
        return Err(ServiceError::validation("email is required"));
    }
    tracing::info!(email = %payload.email, "password reset requested");
    Ok(Json(SimpleOk::new()))
}


/// Create the auth router
pub fn auth_router(state: AuthApiState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(signup))
        .routes(routes!(login))
        .routes(routes!(logout))
        .routes(routes!(refresh))
        .routes(routes!(reset_password))
        .with_state(state)
}
