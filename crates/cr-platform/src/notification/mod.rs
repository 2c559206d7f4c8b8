//! Notification aggregate: status-change notifications, device
//! registrations, and the push-send stub.

pub mod api;
pub mod entity;

pub use api::{notifications_router, NotificationsState};
pub use entity::{DeviceRegister, Notification};
