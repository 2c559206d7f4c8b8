//! Admin aggregate: user administration and in-process analytics over the
//! raw issue rows.

pub mod analytics;
pub mod api;

pub use api::{admin_router, AdminState};
