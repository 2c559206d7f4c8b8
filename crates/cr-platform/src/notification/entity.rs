//! Notification and device entities.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::issue::entity::id_string;

/// A notification row. Written as a side effect of a status change; the
/// core never reads it back.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    #[serde(default, deserialize_with = "id_string::option::deserialize")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "id_string::option::deserialize")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "id_string::option::deserialize")]
    pub issue_id: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Push-notification device registration request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeviceRegister {
    pub device_token: String,
    pub platform: String,
}
