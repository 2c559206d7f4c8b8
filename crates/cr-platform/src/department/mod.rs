//! Department aggregate: static reference data served from the remote
//! store, consumed by the department router's reconciliation step.

pub mod api;

pub use api::{departments_router, DepartmentsState};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::issue::entity::id_string;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Department {
    #[serde(deserialize_with = "id_string::deserialize")]
    pub id: String,
    pub name: String,
}
