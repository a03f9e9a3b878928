//! Axum route handlers.
//!
//! Handlers orchestrate each operation end to end: validate input, resolve
//! existence, resolve the actor's membership role, consult
//! [`crate::authz::decide`], and only then mutate through the backend.
//! Existence is always checked before authorization, so a probe against a
//! missing store yields 404 no matter who asks.

pub mod auth;
pub mod stores;
pub mod workers;
