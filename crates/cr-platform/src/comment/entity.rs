//! Comment entity. Append-only; no edit or delete operation is exposed.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::issue::entity::id_string;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Comment {
    #[serde(deserialize_with = "id_string::deserialize")]
    pub id: String,
    #[serde(default, deserialize_with = "id_string::option::deserialize")]
    pub issue_id: Option<String>,
    /// Null for anonymous comments.
    #[serde(default, deserialize_with = "id_string::option::deserialize")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CommentCreate {
    pub text: String,
}
