//! Notifications REST API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::gateway::{Filters, RemoteStore, RestMethod};
use crate::shared::api_common::SimpleOk;
use crate::shared::error::{Result, ServiceError};
use crate::shared::middleware::Authenticated;

use super::entity::{DeviceRegister, Notification};

/// Notifications service state
#[derive(Clone)]
pub struct NotificationsState {
    pub store: Arc<dyn RemoteStore>,
}

/// List notifications for a user
#[utoipa::path(
    get,
    path = "/{user_id}",
    tag = "notifications",
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Notifications for the user", body = [Notification])
    )
)]
pub async fn get_notifications(
    State(state): State<NotificationsState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Notification>>> {
    let filters = Filters::eq("user_id", &user_id);
    let response = state
        .store
        .request(RestMethod::Get, "notifications", None, Some(&filters))
        .await?;
    Ok(Json(
        response
            .rows()
            .into_iter()
            .filter_map(|row| serde_json::from_value(row).ok())
            .collect(),
    ))
}

/// Register a device token for push notifications
#[utoipa::path(
    post,
    path = "/devices/register",
    tag = "notifications",
    request_body = DeviceRegister,
    responses(
        (status = 200, description = "Registered device row"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn register_device(
    State(state): State<NotificationsState>,
    auth: Authenticated,
    Json(payload): Json<DeviceRegister>,
) -> Result<Json<Value>> {
    let body = json!({
        "user_id": auth.id,
        "device_token": payload.device_token,
        "platform": payload.platform,
    });
    let response = state
        .store
        .request(RestMethod::Post, "devices", Some(body), None)
        .await?;
    if !response.is_success() {
        return Err(ServiceError::upstream(response.status, response.data));
    }
    let created = response
        .data
        .as_array()
        .and_then(|rows| rows.first().cloned())
        .unwrap_or(response.data);
    Ok(Json(created))
}

/// Send a push notification (stub)
///
/// Persists a push log row only; no push provider is integrated.
#[utoipa::path(
    post,
    path = "/push/send",
    tag = "notifications",
    responses(
        (status = 200, description = "Push request logged", body = SimpleOk),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn send_push(
    State(state): State<NotificationsState>,
    auth: Authenticated,
    Json(payload): Json<Value>,
) -> Result<Json<SimpleOk>> {
    let entry = json!({ "sender_id": auth.id, "payload": payload });
    state
        .store
        .request(
            RestMethod::Post,
            "push_logs",
            Some(json!({ "entries": [entry] })),
            None,
        )
        .await?;
    Ok(Json(SimpleOk::new()))
}

/// Create the notifications router
pub fn notifications_router(state: NotificationsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(register_device))
        .routes(routes!(send_push))
        .routes(routes!(get_notifications))
        .with_state(state)
}
