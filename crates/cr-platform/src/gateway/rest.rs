//! Row store client for the hosted Postgres-over-REST service.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde_json::Value;

use super::{Filters, RemoteResponse, RemoteStore, RestMethod};
use crate::shared::error::Result;

/// Production [`RemoteStore`] talking to a Supabase-style REST endpoint.
#[derive(Debug, Clone)]
pub struct SupabaseRest {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SupabaseRest {
    /// `base_url` is the `/rest/v1` base, without a trailing slash.
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&self.api_key) {
            headers.insert("apikey", value);
        }
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", self.api_key)) {
            headers.insert(AUTHORIZATION, value);
        }
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    fn url(&self, collection: &str, filters: Option<&Filters>) -> String {
        let base = format!("{}/{}", self.base_url, collection);
        match filters {
            Some(filters) if !filters.is_empty() => format!("{}?{}", base, filters.to_query()),
            _ => base,
        }
    }
}

#[async_trait]
impl RemoteStore for SupabaseRest {
    async fn request(
        &self,
        method: RestMethod,
        collection: &str,
        payload: Option<Value>,
        filters: Option<&Filters>,
    ) -> Result<RemoteResponse> {
        let headers = self.headers();
        let response = match method {
            RestMethod::Get => {
                self.http
                    .get(self.url(collection, filters))
                    .headers(headers)
                    .send()
                    .await?
            }
            RestMethod::Post => {
                // Filters do not apply to inserts; the payload is the row.
                self.http
                    .post(self.url(collection, None))
                    .headers(headers)
                    .json(&payload.unwrap_or(Value::Null))
                    .send()
                    .await?
            }
            RestMethod::Patch => {
                self.http
                    .patch(self.url(collection, filters))
                    .headers(headers)
                    .json(&payload.unwrap_or(Value::Null))
                    .send()
                    .await?
            }
            RestMethod::Delete => {
                self.http
                    .delete(self.url(collection, filters))
                    .headers(headers)
                    .send()
                    .await?
            }
        };

        Ok(RemoteResponse::from_reqwest(response).await)
    }
}
