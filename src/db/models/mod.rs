//! Database record structures exchanged with the backend.

pub mod memberships;
pub mod stores;
pub mod users;
