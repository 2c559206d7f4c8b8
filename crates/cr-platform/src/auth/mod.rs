//! Auth aggregate: signup, login, refresh, and logout against the hosted
//! identity provider. Tokens are never minted or verified locally.

pub mod api;
pub mod service;

pub use api::{auth_router, AuthApiState};
pub use service::{AuthService, TokenPair};
