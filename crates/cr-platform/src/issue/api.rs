//! Issues REST API
//!
//! Submission is a multipart form (title, description, lat, lng, images[]);
//! everything else is JSON. The form is resolved into an [`IssueDraft`]
//! here, before entering the core.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::shared::api_common::{PageParams, MAX_PAGE_LIMIT};
use crate::shared::error::{Result, ServiceError};
use crate::shared::middleware::Authenticated;

use super::entity::{Issue, IssueDraft, IssuePatch};
use super::service::{ImageUpload, IssueService};

/// Issues service state
#[derive(Clone)]
pub struct IssuesState {
    pub issues: Arc<IssueService>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListIssuesQuery {
    /// Filter by status tag
    pub status: Option<String>,
    /// Filter by category
    pub category: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AssignQuery {
    /// Department to assign the issue to
    pub department_id: String,
}

/// Submit a new issue
///
/// Multipart form: title, description, optional lat/lng, optional images[].
/// A submission that fails content screening is rejected with 400 before
/// any upload or persistence happens.
#[utoipa::path(
    post,
    path = "",
    tag = "issues",
    responses(
        (status = 201, description = "Issue created", body = Issue),
        (status = 400, description = "Submission rejected by content screening"),
        (status = 401, description = "Missing or invalid token"),
        (status = 422, description = "Missing required form fields")
    ),
    security(("bearer_auth" = []))
)]
pub async fn post_issue(
    State(state): State<IssuesState>,
    auth: Authenticated,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Issue>)> {
    let mut title: Option<String> = None;
    let mut description: Option<String> = None;
    let mut lat: Option<f64> = None;
    let mut lng: Option<f64> = None;
    let mut images: Vec<ImageUpload> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ServiceError::validation(err.to_string()))?
    {
        match field.name() {
            Some("title") => {
                title = Some(text_field(field).await?);
            }
            Some("description") => {
                description = Some(text_field(field).await?);
            }
            Some("lat") => {
                lat = Some(float_field(field, "lat").await?);
            }
            Some("lng") => {
                lng = Some(float_field(field, "lng").await?);
            }
            Some("images") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| ServiceError::validation(err.to_string()))?
                    .to_vec();
                images.push(ImageUpload { bytes, filename });
            }
            _ => {}
        }
    }

    let draft = IssueDraft {
        title: title.ok_or_else(|| ServiceError::validation("title is required"))?,
        description: description
            .ok_or_else(|| ServiceError::validation("description is required"))?,
        location: match (lat, lng) {
            (Some(lat), Some(lng)) => Some(format!("{},{}", lat, lng)),
            _ => None,
        },
        status: None,
    };

    let issue = state.issues.create(draft, images, Some(&auth.0)).await?;
    Ok((StatusCode::CREATED, Json(issue)))
}

async fn text_field(field: axum::extract::multipart::Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|err| ServiceError::validation(err.to_string()))
}

async fn float_field(field: axum::extract::multipart::Field<'_>, name: &str) -> Result<f64> {
    let text = text_field(field).await?;
    text.parse()
        .map_err(|_| ServiceError::validation(format!("{} must be a number", name)))
}

/// List issues with optional filters and pagination
#[utoipa::path(
    get,
    path = "",
    tag = "issues",
    params(ListIssuesQuery),
    responses(
        (status = 200, description = "Matching issues", body = [Issue]),
        (status = 422, description = "Limit above the allowed maximum")
    )
)]
pub async fn list_issues(
    State(state): State<IssuesState>,
    Query(query): Query<ListIssuesQuery>,
) -> Result<Json<Vec<Issue>>> {
    if query.limit > MAX_PAGE_LIMIT {
        return Err(ServiceError::validation(format!(
            "limit must be at most {}",
            MAX_PAGE_LIMIT
        )));
    }
    let issues = state
        .issues
        .list(query.status.as_deref(), query.category.as_deref())
        .await?;
    let page = PageParams {
        limit: query.limit,
        offset: query.offset,
    };
    Ok(Json(page.slice(issues)))
}

/// Issues assigned to the calling staff member
#[utoipa::path(
    get,
    path = "/staff/me",
    tag = "issues",
    responses(
        (status = 200, description = "Assigned issues", body = [Issue]),
        (status = 403, description = "Caller is not staff or admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn staff_my_issues(
    State(state): State<IssuesState>,
    auth: Authenticated,
) -> Result<Json<Vec<Issue>>> {
    auth.require_staff()?;
    let issues = state.issues.assigned_to(&auth.id).await?;
    Ok(Json(issues))
}

/// Fetch a single issue
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "issues",
    params(("id" = String, Path, description = "Issue ID")),
    responses(
        (status = 200, description = "Issue found", body = Issue),
        (status = 404, description = "Issue not found")
    )
)]
pub async fn read_issue(
    State(state): State<IssuesState>,
    Path(id): Path<String>,
) -> Result<Json<Issue>> {
    let issue = state
        .issues
        .get(&id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Issue", &id))?;
    Ok(Json(issue))
}

/// Update fields of an issue
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "issues",
    params(("id" = String, Path, description = "Issue ID")),
    request_body = IssuePatch,
    responses(
        (status = 200, description = "Updated issue", body = Issue),
        (status = 404, description = "Issue not found or update not applied")
    ),
    security(("bearer_auth" = []))
)]
pub async fn patch_issue(
    State(state): State<IssuesState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(patch): Json<IssuePatch>,
) -> Result<Json<Issue>> {
    let updated = state
        .issues
        .update(&id, patch, &auth.0)
        .await?
        .ok_or_else(|| ServiceError::not_found("Issue", &id))?;
    Ok(Json(updated))
}

/// Delete an issue (owner only)
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "issues",
    params(("id" = String, Path, description = "Issue ID")),
    responses(
        (status = 204, description = "Issue deleted"),
        (status = 403, description = "Caller does not own the issue"),
        (status = 404, description = "Issue not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_issue(
    State(state): State<IssuesState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.issues.delete(&id, &auth.0).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Assign an issue to a department (staff/admin)
#[utoipa::path(
    post,
    path = "/{id}/assign",
    tag = "issues",
    params(("id" = String, Path, description = "Issue ID"), AssignQuery),
    responses(
        (status = 200, description = "Updated issue", body = Issue),
        (status = 403, description = "Caller is not staff or admin"),
        (status = 404, description = "Issue not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn assign_issue(
    State(state): State<IssuesState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Query(query): Query<AssignQuery>,
) -> Result<Json<Issue>> {
    auth.require_staff()?;
    let patch = IssuePatch {
        status: Some("assigned".to_string()),
        department_id: Some(query.department_id),
        ..Default::default()
    };
    let updated = state
        .issues
        .update(&id, patch, &auth.0)
        .await?
        .ok_or_else(|| ServiceError::not_found("Issue", &id))?;
    Ok(Json(updated))
}

/// Mark an issue resolved (staff/admin)
#[utoipa::path(
    post,
    path = "/{id}/resolve",
    tag = "issues",
    params(("id" = String, Path, description = "Issue ID")),
    responses(
        (status = 200, description = "Updated issue", body = Issue),
        (status = 403, description = "Caller is not staff or admin"),
        (status = 404, description = "Issue not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn resolve_issue(
    State(state): State<IssuesState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Issue>> {
    auth.require_staff()?;
    let patch = IssuePatch {
        status: Some("resolved".to_string()),
        ..Default::default()
    };
    let updated = state
        .issues
        .update(&id, patch, &auth.0)
        .await?
        .ok_or_else(|| ServiceError::not_found("Issue", &id))?;
    Ok(Json(updated))
}

/// Create the issues router
pub fn issues_router(state: IssuesState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(post_issue, list_issues))
        .routes(routes!(staff_my_issues))
        .routes(routes!(read_issue, patch_issue, remove_issue))
        .routes(routes!(assign_issue))
        .routes(routes!(resolve_issue))
        .with_state(state)
}
