//! Database layer for data persistence and access.
//!
//! All persistent state — users, stores, and the membership relation — is
//! reached through the [`Backend`] trait, with two implementations:
//!
//! - [`postgres::PostgresBackend`]: durable backend for real deployments
//! - [`memory::MemoryBackend`]: in-process backend for development and tests
//!
//! Handlers hold an `Arc<dyn Backend>` in application state, so tests can
//! inject the in-memory backend and exercise the full HTTP surface without a
//! database.
//!
//! # Invariants owned by this layer
//!
//! - At most one membership row per (user, store) pair, enforced atomically
//!   on insert (not by a prior existence check). Two racing
//!   `create_membership` calls for the same pair resolve to one success and
//!   one [`DbError::UniqueViolation`].
//! - `create_store_with_owner` either persists both the store and its first
//!   Owner membership or neither.
//! - `delete_store` removes the store's memberships and the store row in a
//!   single transaction.
//!
//! Both backends surface constraint failures with the same table and
//! constraint names so that error mapping above this layer is
//! backend-independent.

pub mod errors;
pub mod memory;
pub mod models;
pub mod postgres;
#[cfg(test)]
mod tests;

use async_trait::async_trait;

use crate::db::errors::{DbError, Result};
use crate::db::models::memberships::{MembershipCreateDBRequest, MembershipDBResponse};
use crate::db::models::stores::{StoreCreateDBRequest, StoreDBResponse, StoreUpdateDBRequest};
use crate::db::models::users::{UserCreateDBRequest, UserDBResponse};
use crate::types::{StoreId, UserId};

pub use memory::MemoryBackend;
pub use postgres::PostgresBackend;

/// Storage backend for users, stores, and memberships.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Persist a new user.
    ///
    /// # Errors
    /// - [`DbError::UniqueViolation`] if the email or username is taken
    async fn create_user(&self, request: &UserCreateDBRequest) -> Result<UserDBResponse>;

    async fn get_user_by_id(&self, id: UserId) -> Result<Option<UserDBResponse>>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserDBResponse>>;

    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserDBResponse>>;

    /// Persist a new store together with its first Owner membership, in one
    /// transaction. The creator is always the first Owner; if the membership
    /// cannot be attached the store row is rolled back.
    async fn create_store_with_owner(
        &self,
        owner_id: UserId,
        request: &StoreCreateDBRequest,
    ) -> Result<(StoreDBResponse, MembershipDBResponse)>;

    async fn get_store(&self, id: StoreId) -> Result<Option<StoreDBResponse>>;

    /// Apply a partial update. Absent fields are left unchanged.
    ///
    /// # Errors
    /// - [`DbError::NotFound`] if the store does not exist
    async fn update_store(&self, id: StoreId, request: &StoreUpdateDBRequest) -> Result<StoreDBResponse>;

    /// Delete a store and all memberships referencing it, in one
    /// transaction. Returns whether a store row was removed.
    async fn delete_store(&self, id: StoreId) -> Result<bool>;

    async fn get_membership(&self, user_id: UserId, store_id: StoreId) -> Result<Option<MembershipDBResponse>>;

    /// Insert a membership row.
    ///
    /// # Errors
    /// - [`DbError::UniqueViolation`] if the (user, store) pair already has a row
    /// - [`DbError::ForeignKeyViolation`] if the user or store does not exist
    async fn create_membership(&self, request: &MembershipCreateDBRequest) -> Result<MembershipDBResponse>;

    /// Delete a membership row. Returns whether a row was removed.
    async fn delete_membership(&self, user_id: UserId, store_id: StoreId) -> Result<bool>;
}

/// Look up the role a user holds in a store, if any.
///
/// Convenience over [`Backend::get_membership`]; this is the lookup the
/// authorization engine's callers use to resolve the actor's role.
pub async fn get_role(backend: &dyn Backend, user_id: UserId, store_id: StoreId) -> Result<Option<crate::authz::Role>> {
    Ok(backend.get_membership(user_id, store_id).await?.map(|m| m.role))
}

impl DbError {
    /// Whether this error is the unique violation raised by a duplicate
    /// (user, store) membership insert.
    pub fn is_duplicate_membership(&self) -> bool {
        matches!(
            self,
            DbError::UniqueViolation { table: Some(table), .. } if table == "store_memberships"
        )
    }
}
