//! Comments REST API, mounted under the issues namespace.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::gateway::{Filters, RemoteStore, RestMethod};
use crate::shared::error::{Result, ServiceError};
use crate::shared::middleware::OptionalAuth;

use super::entity::{Comment, CommentCreate};

/// Comments service state
#[derive(Clone)]
pub struct CommentsState {
    pub store: Arc<dyn RemoteStore>,
}

/// Add a comment to an issue
///
/// Anonymous comments are allowed; without a valid token the comment's
/// user is null.
#[utoipa::path(
    post,
    path = "/{issue_id}/comments",
    tag = "issues",
    params(("issue_id" = String, Path, description = "Issue ID")),
    request_body = CommentCreate,
    responses(
        (status = 200, description = "Created comment", body = Comment),
        (status = 500, description = "Remote store refused the write")
    )
)]
pub async fn add_comment(
    State(state): State<CommentsState>,
    auth: OptionalAuth,
    Path(issue_id): Path<String>,
    Json(payload): Json<CommentCreate>,
) -> Result<Json<Comment>> {
    let note = json!({
        "issue_id": issue_id,
        "user_id": auth.as_ref().map(|user| user.id.clone()),
        "text": payload.text,
    });
    let response = state
        .store
        .request(RestMethod::Post, "comments", Some(note), None)
        .await?;
    if !response.is_success() {
        return Err(ServiceError::upstream(response.status, response.data));
    }

    let created = response
        .data
        .as_array()
        .and_then(|rows| rows.first().cloned())
        .unwrap_or(response.data);
    Ok(Json(serde_json::from_value(created)?))
}

/// List comments on an issue
#[utoipa::path(
    get,
    path = "/{issue_id}/comments",
    tag = "issues",
    params(("issue_id" = String, Path, description = "Issue ID")),
    responses(
        (status = 200, description = "Comments for the issue", body = [Comment])
    )
)]
pub async fn get_comments(
    State(state): State<CommentsState>,
    Path(issue_id): Path<String>,
) -> Json<Vec<Comment>> {
    // An unreachable store yields an empty thread rather than an error;
    // comments are non-critical read-side data.
    let filters = Filters::eq("issue_id", &issue_id);
    match state
        .store
        .request(RestMethod::Get, "comments", None, Some(&filters))
        .await
    {
        Ok(response) => Json(
            response
                .rows()
                .into_iter()
                .filter_map(|row| serde_json::from_value(row).ok())
                .collect(),
        ),
        Err(err) => {
            debug!(issue_id = %issue_id, error = %err, "comment fetch failed, returning empty");
            Json(Vec::new())
        }
    }
}

/// Create the comments router (merged into the issues namespace)
pub fn comments_router(state: CommentsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(add_comment, get_comments))
        .with_state(state)
}
