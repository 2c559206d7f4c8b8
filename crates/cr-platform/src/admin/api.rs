//! Admin REST API.
//!
//! Every endpoint here is gated on the admin role. Analytics endpoints pull
//! the full issue dump and aggregate in-process.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use utoipa::IntoParams;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::gateway::{Filters, RemoteStore, RestMethod};
use crate::shared::api_common::{PageParams, SimpleOk};
use crate::shared::error::{Result, ServiceError};
use crate::shared::middleware::Authenticated;

use super::analytics::{self, DateCount, Hotspot, ResponseTimes};

/// Admin service state
#[derive(Clone)]
pub struct AdminState {
    pub store: Arc<dyn RemoteStore>,
}

impl AdminState {
    async fn all_issues(&self) -> Result<Vec<Value>> {
        let response = self
            .store
            .request(RestMethod::Get, "issues", None, None)
            .await?;
        if !response.is_success() {
            return Err(ServiceError::upstream(response.status, response.data));
        }
        Ok(response.rows())
    }
}

/// Trailing-window query
#[derive(Debug, Deserialize, IntoParams)]
pub struct WindowParams {
    /// Window length in days
    pub days: Option<i64>,
}

/// List all user profiles
#[utoipa::path(
    get,
    path = "/users",
    tag = "admin",
    params(PageParams),
    responses(
        (status = 200, description = "User profiles"),
        (status = 403, description = "Admin role required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<AdminState>,
    auth: Authenticated,
    Query(page): Query<PageParams>,
) -> Result<Json<Vec<Value>>> {
    auth.require_admin()?;
    let response = state
        .store
        .request(RestMethod::Get, "profiles", None, None)
        .await?;
    if !response.is_success() {
        return Err(ServiceError::upstream(response.status, response.data));
    }
    Ok(Json(page.slice(response.rows())))
}

/// Update a user profile
#[utoipa::path(
    patch,
    path = "/users/{user_id}",
    tag = "admin",
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Profile updated", body = SimpleOk),
        (status = 403, description = "Admin role required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    State(state): State<AdminState>,
    auth: Authenticated,
    Path(user_id): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<SimpleOk>> {
    auth.require_admin()?;
    let filters = Filters::eq("id", &user_id);
    state
        .store
        .request(RestMethod::Patch, "profiles", Some(payload), Some(&filters))
        .await?;
    Ok(Json(SimpleOk::new()))
}

/// Delete a user profile
#[utoipa::path(
    delete,
    path = "/users/{user_id}",
    tag = "admin",
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Profile deleted", body = SimpleOk),
        (status = 403, description = "Admin role required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    State(state): State<AdminState>,
    auth: Authenticated,
    Path(user_id): Path<String>,
) -> Result<Json<SimpleOk>> {
    auth.require_admin()?;
    let filters = Filters::eq("id", &user_id);
    state
        .store
        .request(RestMethod::Delete, "profiles", None, Some(&filters))
        .await?;
    Ok(Json(SimpleOk::new()))
}

/// Issues created per day
#[utoipa::path(
    get,
    path = "/analytics/issues-by-time",
    tag = "admin",
    params(WindowParams),
    responses(
        (status = 200, description = "Daily creation counts", body = [DateCount]),
        (status = 403, description = "Admin role required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn issues_by_time(
    State(state): State<AdminState>,
    auth: Authenticated,
    Query(params): Query<WindowParams>,
) -> Result<Json<Vec<DateCount>>> {
    auth.require_admin()?;
    let rows = state.all_issues().await?;
    let days = params.days.unwrap_or(7);
    Ok(Json(analytics::issues_by_time(&rows, days, Utc::now())))
}

/// Average resolution latency
#[utoipa::path(
    get,
    path = "/analytics/response-times",
    tag = "admin",
    params(WindowParams),
    responses(
        (status = 200, description = "Resolution latency stats", body = ResponseTimes),
        (status = 403, description = "Admin role required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn response_times(
    State(state): State<AdminState>,
    auth: Authenticated,
    Query(params): Query<WindowParams>,
) -> Result<Json<ResponseTimes>> {
    auth.require_admin()?;
    let rows = state.all_issues().await?;
    let days = params.days.unwrap_or(30);
    Ok(Json(analytics::response_times(&rows, days, Utc::now())))
}

/// Geographic issue hotspots
#[utoipa::path(
    get,
    path = "/analytics/hotspots",
    tag = "admin",
    responses(
        (status = 200, description = "Issue clusters, most crowded first", body = [Hotspot]),
        (status = 403, description = "Admin role required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn hotspots(
    State(state): State<AdminState>,
    auth: Authenticated,
) -> Result<Json<Vec<Hotspot>>> {
    auth.require_admin()?;
    let rows = state.all_issues().await?;
    Ok(Json(analytics::hotspots(&rows)))
}

/// Create the admin router
pub fn admin_router(state: AdminState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_users))
        .routes(routes!(update_user, delete_user))
        .routes(routes!(issues_by_time))
        .routes(routes!(response_times))
        .routes(routes!(hotspots))
        .with_state(state)
}
