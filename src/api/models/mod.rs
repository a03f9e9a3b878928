//! Request/response models for API communication.

pub mod auth;
pub mod stores;
pub mod users;
pub mod workers;
