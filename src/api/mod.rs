//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: axum route handlers for all endpoints
//! - **[`models`]**: request/response data structures
//!
//! # API Structure
//!
//! - **Authentication** (`/auth/*`): registration and login
//! - **Stores** (`/stores`, `/stores/{id}`): store lifecycle
//! - **Workers** (`/stores/{id}/workers/*`): per-store roster management
//!
//! All endpoints are documented with OpenAPI annotations using `utoipa`;
//! the rendered reference is served at `/docs`.

pub mod handlers;
pub mod models;
