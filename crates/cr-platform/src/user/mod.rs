//! User aggregate: the caller's own profile.

pub mod api;

pub use api::{users_router, UsersState};
