//! Shared infrastructure: error types, API commons, auth middleware.

pub mod api_common;
pub mod error;
pub mod middleware;
