//! Users REST API.
//!
//! The profile row store and the identity provider are separate systems:
//! reads come from the provider's user record, writes go to the `profiles`
//! collection keyed by the provider's user id.

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::gateway::{Filters, RemoteStore, RestMethod};
use crate::shared::api_common::SimpleOk;
use crate::shared::error::{Result, ServiceError};
use crate::shared::middleware::Authenticated;

/// Users service state
#[derive(Clone)]
pub struct UsersState {
    pub store: Arc<dyn RemoteStore>,
}

/// The caller's identity as seen by the platform.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserProfile {
    pub id: String,
    pub email: Option<String>,
    pub role: String,
}

/// Get the caller's own profile
#[utoipa::path(
    get,
    path = "/me",
    tag = "users",
    responses(
        (status = 200, description = "The caller's profile", body = UserProfile),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_me(auth: Authenticated) -> Json<UserProfile> {
    Json(UserProfile {
        id: auth.id.clone(),
        email: auth.email.clone(),
        role: auth.role.as_str().to_string(),
    })
}

/// Update the caller's own profile
#[utoipa::path(
    patch,
    path = "/me",
    tag = "users",
    responses(
        (status = 200, description = "Profile updated", body = SimpleOk),
        (status = 400, description = "Profile store refused the update"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_me(
    State(state): State<UsersState>,
    auth: Authenticated,
    Json(payload): Json<Value>,
) -> Result<Json<SimpleOk>> {
    let mut body = match payload {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    body.insert("id".to_string(), Value::String(auth.id.clone()));

    let filters = Filters::eq("id", &auth.id);
    let response = state
        .store
        .request(
            RestMethod::Patch,
            "profiles",
            Some(Value::Object(body)),
            Some(&filters),
        )
        .await?;
    if !(response.status == 200 || response.status == 204) {
        return Err(ServiceError::bad_request(
            "Failed to update profile",
            Some(response.data),
        ));
    }
    Ok(Json(SimpleOk::new()))
}

/// Create the users router
pub fn users_router(state: UsersState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(get_me))
        .routes(routes!(update_me))
        .with_state(state)
}
