//! Departments REST API.

use axum::{extract::State, Json};
use std::sync::Arc;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::gateway::{RemoteStore, RestMethod};
use crate::shared::error::Result;

use super::Department;

/// Departments service state
#[derive(Clone)]
pub struct DepartmentsState {
    pub store: Arc<dyn RemoteStore>,
}

/// List all departments
#[utoipa::path(
    get,
    path = "",
    tag = "departments",
    responses(
        (status = 200, description = "All departments", body = [Department])
    )
)]
pub async fn list_departments(
    State(state): State<DepartmentsState>,
) -> Result<Json<Vec<Department>>> {
    let response = state
        .store
        .request(RestMethod::Get, "departments", None, None)
        .await?;
    Ok(Json(
        response
            .rows()
            .into_iter()
            .filter_map(|row| serde_json::from_value(row).ok())
            .collect(),
    ))
}

/// Create the departments router
pub fn departments_router(state: DepartmentsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_departments))
        .with_state(state)
}
