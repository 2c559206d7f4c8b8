//! Auth service.
//!
//! Thin orchestration over the identity provider: each operation maps the
//! provider's HTTP status onto the service error taxonomy and passes the
//! provider's body through untouched.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::gateway::AuthProvider;
use crate::shared::error::{Result, ServiceError};

/// Access/refresh token pair returned by a successful grant.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenPair {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_type: String,
}

impl TokenPair {
    fn from_grant(data: &Value) -> Self {
        Self {
            access_token: data
                .get("access_token")
                .and_then(Value::as_str)
                .map(String::from),
            refresh_token: data
                .get("refresh_token")
                .and_then(Value::as_str)
                .map(String::from),
            token_type: "bearer".to_string(),
        }
    }
}

/// Auth operations over the identity provider
pub struct AuthService {
    provider: Arc<dyn AuthProvider>,
}

impl AuthService {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }

    /// Register a new account. Returns the provider's user record.
    pub async fn signup(&self, email: &str, password: &str) -> Result<Value> {
        let response = self.provider.signup(email, password).await?;
        if !(response.status == 200 || response.status == 201) {
            return Err(ServiceError::bad_request(
                "Signup failed",
                Some(response.data),
            ));
        }
        Ok(response.data)
    }

    /// Exchange credentials for a token pair.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair> {
        let response = self.provider.password_grant(email, password).await?;
        if response.status != 200 {
            return Err(ServiceError::unauthenticated("Invalid credentials"));
        }
        Ok(TokenPair::from_grant(&response.data))
    }

    /// Exchange a refresh token for a fresh token pair.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let response = self.provider.refresh_grant(refresh_token).await?;
        if response.status != 200 {
            return Err(ServiceError::unauthenticated("Invalid refresh token"));
        }
        Ok(TokenPair::from_grant(&response.data))
    }

    /// Revoke the given access token.
    pub async fn logout(&self, token: &str) -> Result<()> {
        let response = self.provider.logout(token).await?;
        if !(response.status == 200 || response.status == 204) {
            return Err(ServiceError::bad_request(
                "Failed to logout",
                Some(response.data),
            ));
        }
        Ok(())
    }
}
