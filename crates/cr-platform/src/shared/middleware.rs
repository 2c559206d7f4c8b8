//! API Middleware
//!
//! Bearer-token authentication for Axum. Every request is validated
//! per-request against the hosted identity provider; there is no local
//! session store.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use crate::identity::{CurrentUser, IdentityResolver};
use crate::shared::error::ServiceError;

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<IdentityResolver>,
}

/// Authenticated user extractor.
///
/// Resolves the bearer token against the identity provider and yields the
/// normalized user record.
pub struct Authenticated(pub CurrentUser);

impl std::ops::Deref for Authenticated {
    type Target = CurrentUser;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Extract the token from an Authorization header value.
///
/// A "Bearer " prefix is stripped; a bare token is accepted as-is.
pub fn extract_bearer_token(header: &str) -> &str {
    header.strip_prefix("Bearer ").unwrap_or(header)
}

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let app_state = parts
            .extensions
            .get::<AppState>()
            .ok_or_else(|| ServiceError::internal("Auth service not configured"))?;

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(extract_bearer_token)
            .ok_or_else(|| ServiceError::unauthenticated("Missing Authorization header"))?
            .to_string();

        let user = app_state.identity.resolve(&token).await?;
        Ok(Authenticated(user))
    }
}

/// Optional authentication extractor.
///
/// Yields `None` for missing or invalid tokens instead of rejecting;
/// used where anonymous access is allowed (comment submission).
pub struct OptionalAuth(pub Option<CurrentUser>);

impl std::ops::Deref for OptionalAuth {
    type Target = Option<CurrentUser>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(app_state) = parts.extensions.get::<AppState>() else {
            return Ok(OptionalAuth(None));
        };

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(extract_bearer_token)
            .map(String::from);

        let Some(token) = token else {
            return Ok(OptionalAuth(None));
        };

        match app_state.identity.resolve(&token).await {
            Ok(user) => Ok(OptionalAuth(Some(user))),
            Err(_) => Ok(OptionalAuth(None)),
        }
    }
}

/// Layer that makes [`AppState`] available to the extractors via request
/// extensions.
#[derive(Clone)]
pub struct AuthLayer {
    state: AppState,
}

impl AuthLayer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            state: self.state.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    state: AppState,
}

impl<S, B> Service<axum::http::Request<B>> for AuthMiddleware<S>
where
    S: Service<axum::http::Request<B>> + Send + Clone + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        req.extensions_mut().insert(self.state.clone());

        let future = self.inner.call(req);
        Box::pin(async move { future.await })
    }
}
