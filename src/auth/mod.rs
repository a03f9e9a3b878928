//! Authentication and authorization system.
//!
//! # Authentication
//!
//! Token-based authentication for all mutating store operations:
//! - Users log in via `/auth/login` with email/password
//! - The server returns a signed JWT bound to the user's id
//! - Clients pass it in the `Authorization: Bearer <token>` header
//! - [`current_user`] extracts and verifies it per request
//!
//! Failed lookups and failed password verification produce the same error,
//! so the login endpoint cannot be used to enumerate accounts.
//!
//! # Authorization
//!
//! Per-store access control lives in [`crate::authz`]: handlers resolve the
//! actor's membership role and consult the pure decision table before any
//! mutation.
//!
//! # Modules
//!
//! - [`current_user`]: extractor for the authenticated user in handlers
//! - [`password`]: password hashing and verification using Argon2
//! - [`session`]: JWT creation and verification

pub mod current_user;
pub mod password;
pub mod session;
