//! CivicReport Platform
//!
//! Backend-for-frontend for a civic issue reporting client. All state lives
//! in hosted services: a Postgres-over-REST row store for rows, an identity
//! provider for accounts and tokens, and an image host for photos. This
//! crate owns the policy between them:
//! - Issue lifecycle (create, triage, assign, resolve, delete)
//! - Content screening of new submissions
//! - Keyword-based department routing
//! - Status-change notifications
//! - Role-gated staff and admin surfaces, plus in-process analytics
//!
//! ## Module Organization (Aggregate-based)
//!
//! Each aggregate contains:
//! - `entity` - Domain entities (where applicable)
//! - `service` - Orchestration logic (where applicable)
//! - `api` - REST endpoints

// Core aggregates
pub mod issue;
pub mod comment;
pub mod department;
pub mod notification;
pub mod user;

// Authentication & authorization
pub mod auth;
pub mod identity;

// Staff/admin surfaces
pub mod admin;
pub mod faq;

// Domain policies
pub mod routing;
pub mod screening;

// Outbound integrations
pub mod gateway;
pub mod media;

// Shared infrastructure
pub mod shared;

// Re-export common types from shared
pub use shared::error::{Result, ServiceError};
pub use shared::middleware::{AppState, AuthLayer, Authenticated, OptionalAuth};

// Re-export main entity types for convenience
pub use comment::entity::{Comment, CommentCreate};
pub use identity::{CurrentUser, IdentityResolver, Role};
pub use issue::entity::{Image, Issue, IssueDraft, IssuePatch};
pub use notification::entity::{DeviceRegister, Notification};

// Re-export services
pub use auth::service::AuthService;
pub use issue::service::IssueService;

// Re-export outbound gateways
pub use gateway::{
    AuthProvider, Filters, RemoteResponse, RemoteStore, RestMethod, SupabaseAuth, SupabaseRest,
};
pub use media::{CloudinaryMedia, MediaStore, UploadOutcome};

/// API state and router re-exports, one pair per aggregate.
pub mod api {
    pub use crate::admin::api::{admin_router, AdminState};
    pub use crate::auth::api::{auth_router, AuthApiState};
    pub use crate::comment::api::{comments_router, CommentsState};
    pub use crate::department::api::{departments_router, DepartmentsState};
    pub use crate::faq::api::{faq_router, FaqState};
    pub use crate::issue::api::{issues_router, IssuesState};
    pub use crate::notification::api::{notifications_router, NotificationsState};
    pub use crate::user::api::{users_router, UsersState};
}
