//! FAQ REST API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::gateway::{RemoteStore, RestMethod};
use crate::shared::error::Result;

use super::find_answer;

/// FAQ service state
#[derive(Clone)]
pub struct FaqState {
    pub store: Arc<dyn RemoteStore>,
}

/// Free-text question
#[derive(Debug, Deserialize, ToSchema)]
pub struct AskRequest {
    pub question: String,
}

/// Matched answer
#[derive(Debug, Serialize, ToSchema)]
pub struct AskResponse {
    pub answer: String,
}

/// List published FAQ entries
#[utoipa::path(
    get,
    path = "",
    tag = "faq",
    responses(
        (status = 200, description = "FAQ entries")
    )
)]
pub async fn list_faqs(State(state): State<FaqState>) -> Result<Json<Vec<Value>>> {
    let response = state
        .store
        .request(RestMethod::Get, "faq", None, None)
        .await?;
    Ok(Json(response.rows()))
}

/// Look up an answer for a free-text question
#[utoipa::path(
    post,
    path = "/ask",
    tag = "faq",
    request_body = AskRequest,
    responses(
        (status = 200, description = "Best matching answer", body = AskResponse)
    )
)]
pub async fn ask(
    State(state): State<FaqState>,
    Json(payload): Json<AskRequest>,
) -> Result<Json<AskResponse>> {
    let response = state
        .store
        .request(RestMethod::Get, "faq", None, None)
        .await?;
    let answer = find_answer(&response.rows(), &payload.question);
    Ok(Json(AskResponse { answer }))
}

/// Create the FAQ router
pub fn faq_router(state: FaqState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_faqs))
        .routes(routes!(ask))
        .with_state(state)
}
