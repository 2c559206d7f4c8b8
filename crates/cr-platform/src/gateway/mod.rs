//! Remote Data Gateway
//!
//! Every entity in the system lives behind a hosted Postgres-over-REST row
//! store, and every auth operation behind a hosted identity provider. This
//! module owns the outbound HTTP surface for both: filtered row requests and
//! the small set of auth calls. One outbound call per invocation, no retry.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

use crate::shared::error::Result;

mod auth;
mod rest;

pub use auth::SupabaseAuth;
pub use rest::SupabaseRest;

/// Outbound request method against a row collection.
///
/// The set is closed: an unsupported method is unrepresentable rather than a
/// runtime error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestMethod {
    Get,
    Post,
    Patch,
    Delete,
}

/// Row filters, serialized PostgREST-style into the query string.
///
/// Each entry is a column, a comparison operator (default `eq`), and a
/// value, rendered as `column=op.value`. Declaration order is preserved.
#[derive(Debug, Clone, Default)]
pub struct Filters(Vec<(String, String, String)>);

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Equality filter (the default operator).
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new().and_eq(column, value)
    }

    pub fn and_eq(self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.and_op(column, "eq", value)
    }

    /// Filter with an explicit comparison operator.
    pub fn and_op(
        mut self,
        column: impl Into<String>,
        op: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.0.push((column.into(), op.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render as a query string without the leading `?`.
    pub fn to_query(&self) -> String {
        self.0
            .iter()
            .map(|(col, op, value)| format!("{}={}.{}", col, op, value))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Raw response from the remote store or identity provider.
///
/// Non-2xx statuses are carried through, never raised; callers inspect
/// `status`. A body that fails to parse as JSON becomes `{"text": <body>}`.
#[derive(Debug, Clone)]
pub struct RemoteResponse {
    pub status: u16,
    pub data: Value,
    pub headers: HashMap<String, String>,
}

impl RemoteResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body as an array of rows; empty when the body is not an array.
    pub fn rows(&self) -> Vec<Value> {
        self.data.as_array().cloned().unwrap_or_default()
    }

    pub(crate) async fn from_reqwest(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await.unwrap_or_default();
        let data = serde_json::from_str(&body)
            .unwrap_or_else(|_| serde_json::json!({ "text": body }));
        Self {
            status,
            data,
            headers,
        }
    }
}

/// Filtered CRUD access to named row collections.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Issue one request against a collection.
    ///
    /// Contract: never errors for non-2xx HTTP statuses, only for
    /// transport-level failures.
    async fn request(
        &self,
        method: RestMethod,
        collection: &str,
        payload: Option<Value>,
        filters: Option<&Filters>,
    ) -> Result<RemoteResponse>;
}

/// The hosted identity provider's auth operations.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn signup(&self, email: &str, password: &str) -> Result<RemoteResponse>;

    /// Exchange credentials for an access token (password grant, form data).
    async fn password_grant(&self, email: &str, password: &str) -> Result<RemoteResponse>;

    /// Exchange a refresh token for a new access token (form data).
    async fn refresh_grant(&self, refresh_token: &str) -> Result<RemoteResponse>;

    async fn logout(&self, token: &str) -> Result<RemoteResponse>;

    /// The provider's "who am I" endpoint for a bearer token.
    async fn user_info(&self, token: &str) -> Result<RemoteResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_default_to_eq() {
        let filters = Filters::eq("id", "abc");
        assert_eq!(filters.to_query(), "id=eq.abc");
    }

    #[test]
    fn filters_support_explicit_operators_in_order() {
        let filters = Filters::eq("status", "pending").and_op("created_at", "gte", "2024-01-01");
        assert_eq!(
            filters.to_query(),
            "status=eq.pending&created_at=gte.2024-01-01"
        );
    }

    #[test]
    fn rows_is_empty_for_non_array_bodies() {
        let response = RemoteResponse {
            status: 200,
            data: serde_json::json!({"id": "1"}),
            headers: HashMap::new(),
        };
        assert!(response.rows().is_empty());

        let response = RemoteResponse {
            status: 200,
            data: serde_json::json!([{"id": "1"}]),
            headers: HashMap::new(),
        };
        assert_eq!(response.rows().len(), 1);
    }

    #[test]
    fn success_is_any_2xx() {
        for (status, expected) in [(199, false), (200, true), (204, true), (299, true), (300, false), (404, false)] {
            let response = RemoteResponse {
                status,
                data: Value::Null,
                headers: HashMap::new(),
            };
            assert_eq!(response.is_success(), expected, "status {}", status);
        }
    }
}
