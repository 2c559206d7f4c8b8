//! Identity provider client (signup, token grants, logout, user lookup).

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde_json::json;

use super::{AuthProvider, RemoteResponse};
use crate::shared::error::Result;

/// Production [`AuthProvider`] talking to a Supabase-style `/auth/v1` API.
#[derive(Debug, Clone)]
pub struct SupabaseAuth {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SupabaseAuth {
    /// `base_url` is the `/auth/v1` base, without a trailing slash.
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn headers(&self, token: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&self.api_key) {
            headers.insert("apikey", value);
        }
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = token {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(AUTHORIZATION, value);
            }
        }
        headers
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuth {
    async fn signup(&self, email: &str, password: &str) -> Result<RemoteResponse> {
        let response = self
            .http
            .post(self.url("/signup"))
            .headers(self.headers(None))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        Ok(RemoteResponse::from_reqwest(response).await)
    }

    async fn password_grant(&self, email: &str, password: &str) -> Result<RemoteResponse> {
        let response = self
            .http
            .post(self.url("/token"))
            .headers(self.headers(None))
            .form(&[
                ("grant_type", "password"),
                ("username", email),
                ("password", password),
            ])
            .send()
            .await?;
        Ok(RemoteResponse::from_reqwest(response).await)
    }

    async fn refresh_grant(&self, refresh_token: &str) -> Result<RemoteResponse> {
        let response = self
            .http
            .post(self.url("/token"))
            .headers(self.headers(None))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await?;
        Ok(RemoteResponse::from_reqwest(response).await)
    }

    async fn logout(&self, token: &str) -> Result<RemoteResponse> {
        let response = self
            .http
            .post(self.url("/logout"))
            .headers(self.headers(Some(token)))
            .send()
            .await?;
        Ok(RemoteResponse::from_reqwest(response).await)
    }

    async fn user_info(&self, token: &str) -> Result<RemoteResponse> {
        let response = self
            .http
            .get(self.url("/user"))
            .headers(self.headers(Some(token)))
            .send()
            .await?;
        Ok(RemoteResponse::from_reqwest(response).await)
    }
}
