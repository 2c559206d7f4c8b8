//! Comment aggregate: append-only discussion threads on issues.

pub mod api;
pub mod entity;

pub use api::{comments_router, CommentsState};
pub use entity::{Comment, CommentCreate};
