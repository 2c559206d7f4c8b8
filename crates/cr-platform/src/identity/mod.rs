//! Identity Resolver
//!
//! Turns a bearer token into a normalized user record by asking the hosted
//! identity provider who the token belongs to. Nothing is persisted locally;
//! the record is a transient per-request view.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::gateway::AuthProvider;
use crate::shared::error::{Result, ServiceError};

/// Role gating endpoint access.
///
/// Unknown role strings normalize to `Citizen`, so an unrecognized role is
/// never granted staff or admin access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Citizen,
    Staff,
    Admin,
}

impl Role {
    pub fn parse(value: &str) -> Self {
        match value {
            "staff" => Role::Staff,
            "admin" => Role::Admin,
            _ => Role::Citizen,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Citizen => "citizen",
            Role::Staff => "staff",
            Role::Admin => "admin",
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Staff | Role::Admin)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// Normalized per-request user record.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CurrentUser {
    pub id: String,
    pub email: Option<String>,
    pub role: Role,
    /// The provider's raw user record, for callers that need extra claims.
    #[serde(skip)]
    pub raw: Value,
}

impl CurrentUser {
    pub fn require_staff(&self) -> Result<()> {
        if self.role.is_staff() {
            Ok(())
        } else {
            Err(ServiceError::forbidden("Staff role required"))
        }
    }

    pub fn require_admin(&self) -> Result<()> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::forbidden("Admin role required"))
        }
    }
}

/// Pick the role claim with the contractual precedence: top-level `role`,
/// then `user_metadata.role`, then `app_metadata.role`, else citizen.
/// An empty-string claim counts as absent and falls through.
fn role_claim(record: &Value) -> Role {
    let claim = record
        .get("role")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .or_else(|| {
            record
                .get("user_metadata")
                .and_then(|m| m.get("role"))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        })
        .or_else(|| {
            record
                .get("app_metadata")
                .and_then(|m| m.get("role"))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        });
    claim.map(Role::parse).unwrap_or(Role::Citizen)
}

/// Resolves bearer tokens to [`CurrentUser`] records.
pub struct IdentityResolver {
    provider: Arc<dyn AuthProvider>,
}

impl IdentityResolver {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }

    /// Validate a bearer token against the provider's user-info endpoint.
    ///
    /// Any non-200 answer is an authentication failure, as is a record
    /// without a subject id.
    pub async fn resolve(&self, token: &str) -> Result<CurrentUser> {
        let response = self.provider.user_info(token).await?;
        if response.status != 200 {
            return Err(ServiceError::unauthenticated("Invalid or expired token"));
        }

        let record = response.data;
        let id = record
            .get("id")
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| ServiceError::unauthenticated("User record has no id"))?;
        let email = record
            .get("email")
            .and_then(Value::as_str)
            .map(String::from);
        let role = role_claim(&record);

        Ok(CurrentUser {
            id,
            email,
            role,
            raw: record,
        })
    }
}
