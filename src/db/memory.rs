//! In-memory implementation of the storage backend.
//!
//! All state lives in `HashMap`s guarded by a `tokio::sync::RwLock`. Not
//! durable: everything is lost on restart. Intended for local development
//! and tests, where it stands in for PostgreSQL without external
//! dependencies.
//!
//! The constraint behavior of the real schema is reproduced here — unique
//! email/username, the (user, store) membership primary key, and foreign-key
//! checks — with the same table and constraint names, so error handling
//! above this layer cannot tell the backends apart. Mutations take the write
//! lock for their whole span, which gives the same one-winner outcome for
//! racing inserts that the database constraint gives.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::Backend;
use crate::db::errors::{DbError, Result};
use crate::db::models::memberships::{MembershipCreateDBRequest, MembershipDBResponse};
use crate::db::models::stores::{StoreCreateDBRequest, StoreDBResponse, StoreUpdateDBRequest};
use crate::db::models::users::{UserCreateDBRequest, UserDBResponse};
use crate::types::{StoreId, UserId};

#[derive(Default)]
struct State {
    users: HashMap<UserId, UserDBResponse>,
    stores: HashMap<StoreId, StoreDBResponse>,
    memberships: HashMap<(UserId, StoreId), MembershipDBResponse>,
}

/// In-memory storage backend.
#[derive(Default)]
pub struct MemoryBackend {
    state: RwLock<State>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

fn unique_violation(table: &str, constraint: &str) -> DbError {
    DbError::UniqueViolation {
        constraint: Some(constraint.to_string()),
        table: Some(table.to_string()),
        message: format!("duplicate key value violates unique constraint \"{constraint}\""),
    }
}

fn foreign_key_violation(table: &str, constraint: &str) -> DbError {
    DbError::ForeignKeyViolation {
        constraint: Some(constraint.to_string()),
        table: Some(table.to_string()),
        message: format!("insert on table \"{table}\" violates foreign key constraint \"{constraint}\""),
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn create_user(&self, request: &UserCreateDBRequest) -> Result<UserDBResponse> {
        let mut state = self.state.write().await;

        if state.users.values().any(|u| u.email == request.email) {
            return Err(unique_violation("users", "users_email_key"));
        }
        if state.users.values().any(|u| u.username == request.username) {
            return Err(unique_violation("users", "users_username_key"));
        }

        let user = UserDBResponse {
            id: Uuid::new_v4(),
            username: request.username.clone(),
            email: request.email.clone(),
            password_hash: request.password_hash.clone(),
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user_by_id(&self, id: UserId) -> Result<Option<UserDBResponse>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserDBResponse>> {
        Ok(self.state.read().await.users.values().find(|u| u.email == email).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserDBResponse>> {
        Ok(self.state.read().await.users.values().find(|u| u.username == username).cloned())
    }

    async fn create_store_with_owner(
        &self,
        owner_id: UserId,
        request: &StoreCreateDBRequest,
    ) -> Result<(StoreDBResponse, MembershipDBResponse)> {
        let mut state = self.state.write().await;

        if !state.users.contains_key(&owner_id) {
            return Err(foreign_key_violation("store_memberships", "store_memberships_user_id_fkey"));
        }

        let store = StoreDBResponse {
            id: Uuid::new_v4(),
            name: request.name.clone(),
            description: request.description.clone(),
            logo_path: request.logo_path.clone(),
            address: request.address.clone(),
            city: request.city.clone(),
            municipality: request.municipality.clone(),
            province: request.province.clone(),
            phone_number: request.phone_number.clone(),
            email: request.email.clone(),
            created_at: Utc::now(),
        };
        let membership = MembershipDBResponse {
            user_id: owner_id,
            store_id: store.id,
            role: crate::authz::Role::Owner,
            assigned_at: Utc::now(),
        };

        state.stores.insert(store.id, store.clone());
        state.memberships.insert((owner_id, store.id), membership.clone());
        Ok((store, membership))
    }

    async fn get_store(&self, id: StoreId) -> Result<Option<StoreDBResponse>> {
        Ok(self.state.read().await.stores.get(&id).cloned())
    }

    async fn update_store(&self, id: StoreId, request: &StoreUpdateDBRequest) -> Result<StoreDBResponse> {
        let mut state = self.state.write().await;
        let store = state.stores.get_mut(&id).ok_or(DbError::NotFound)?;

        // Same coalesce semantics as the SQL UPDATE: absent fields keep the
        // stored value.
        store.name = request.name.clone().unwrap_or_else(|| store.name.clone());
        store.description = request.description.clone().or_else(|| store.description.clone());
        store.address = request.address.clone().or_else(|| store.address.clone());
        store.city = request.city.clone().or_else(|| store.city.clone());
        store.municipality = request.municipality.clone().or_else(|| store.municipality.clone());
        store.province = request.province.clone().or_else(|| store.province.clone());
        store.phone_number = request.phone_number.clone().or_else(|| store.phone_number.clone());
        store.email = request.email.clone().or_else(|| store.email.clone());

        Ok(store.clone())
    }

    async fn delete_store(&self, id: StoreId) -> Result<bool> {
        let mut state = self.state.write().await;
        state.memberships.retain(|(_, store_id), _| *store_id != id);
        Ok(state.stores.remove(&id).is_some())
    }

    async fn get_membership(&self, user_id: UserId, store_id: StoreId) -> Result<Option<MembershipDBResponse>> {
        Ok(self.state.read().await.memberships.get(&(user_id, store_id)).cloned())
    }

    async fn create_membership(&self, request: &MembershipCreateDBRequest) -> Result<MembershipDBResponse> {
        let mut state = self.state.write().await;

        if !state.users.contains_key(&request.user_id) {
            return Err(foreign_key_violation("store_memberships", "store_memberships_user_id_fkey"));
        }
        if !state.stores.contains_key(&request.store_id) {
            return Err(foreign_key_violation("store_memberships", "store_memberships_store_id_fkey"));
        }
        if state.memberships.contains_key(&(request.user_id, request.store_id)) {
            return Err(unique_violation("store_memberships", "store_memberships_pkey"));
        }

        let membership = MembershipDBResponse {
            user_id: request.user_id,
            store_id: request.store_id,
            role: request.role,
            assigned_at: Utc::now(),
        };
        state.memberships.insert((request.user_id, request.store_id), membership.clone());
        Ok(membership)
    }

    async fn delete_membership(&self, user_id: UserId, store_id: StoreId) -> Result<bool> {
        Ok(self.state.write().await.memberships.remove(&(user_id, store_id)).is_some())
    }
}
