//! Issue aggregate: entities, lifecycle orchestration, REST API.

pub mod api;
pub mod entity;
pub mod service;

pub use api::{issues_router, IssuesState};
pub use entity::{Image, Issue, IssueDraft, IssuePatch};
pub use service::{ImageUpload, IssueService};
