//! PostgreSQL implementation of the storage backend.
//!
//! Migrations are executed on connect via `sqlx::migrate!` so the schema is
//! present before the service handles requests. Queries are runtime-bound;
//! the uniqueness and referential invariants live in the schema (unique
//! indexes on users, the composite primary key on store_memberships), and
//! constraint failures surface through [`DbError`]'s sqlx categorization.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use crate::authz::Role;
use crate::config::PoolSettings;
use crate::db::Backend;
use crate::db::errors::{DbError, Result};
use crate::db::models::memberships::{MembershipCreateDBRequest, MembershipDBResponse};
use crate::db::models::stores::{StoreCreateDBRequest, StoreDBResponse, StoreUpdateDBRequest};
use crate::db::models::users::{UserCreateDBRequest, UserDBResponse};
use crate::types::{StoreId, UserId, abbrev_uuid};

// Database entity models
#[derive(Debug, Clone, FromRow)]
struct UserRow {
    id: UserId,
    username: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
struct StoreRow {
    id: StoreId,
    name: String,
    description: Option<String>,
    logo_path: Option<String>,
    address: Option<String>,
    city: Option<String>,
    municipality: Option<String>,
    province: Option<String>,
    phone_number: Option<String>,
    email: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
struct MembershipRow {
    user_id: UserId,
    store_id: StoreId,
    role: String,
    assigned_at: DateTime<Utc>,
}

impl From<UserRow> for UserDBResponse {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

impl From<StoreRow> for StoreDBResponse {
    fn from(row: StoreRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            logo_path: row.logo_path,
            address: row.address,
            city: row.city,
            municipality: row.municipality,
            province: row.province,
            phone_number: row.phone_number,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

impl TryFrom<MembershipRow> for MembershipDBResponse {
    type Error = DbError;

    fn try_from(row: MembershipRow) -> Result<Self> {
        let role: Role = row
            .role
            .parse()
            .map_err(|e: String| DbError::Other(anyhow::anyhow!("corrupt membership row: {e}")))?;
        Ok(Self {
            user_id: row.user_id,
            store_id: row.store_id,
            role,
            assigned_at: row.assigned_at,
        })
    }
}

/// Durable storage backend backed by PostgreSQL.
pub struct PostgresBackend {
    pool: PgPool,
}

impl PostgresBackend {
    /// Connect to the configured database and run pending migrations.
    pub async fn connect(url: &str, settings: &PoolSettings) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(std::time::Duration::from_secs(settings.acquire_timeout_secs))
            .connect(url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Build a backend from an existing pool. Does not run migrations.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Backend for PostgresBackend {
    #[instrument(skip(self, request), fields(username = %request.username), err)]
    async fn create_user(&self, request: &UserCreateDBRequest) -> Result<UserDBResponse> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.username)
        .bind(&request.email)
        .bind(&request.password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn get_user_by_id(&self, id: UserId) -> Result<Option<UserDBResponse>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self, email), err)]
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserDBResponse>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self, username), err)]
    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserDBResponse>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self, request), fields(owner_id = %abbrev_uuid(&owner_id), name = %request.name), err)]
    async fn create_store_with_owner(
        &self,
        owner_id: UserId,
        request: &StoreCreateDBRequest,
    ) -> Result<(StoreDBResponse, MembershipDBResponse)> {
        // Store row and first Owner membership commit together; a failure on
        // the membership insert rolls the store back.
        let mut tx = self.pool.begin().await?;

        let store = sqlx::query_as::<_, StoreRow>(
            r#"
            INSERT INTO stores (id, name, description, logo_path, address, city, municipality, province, phone_number, email)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .bind(&request.description)
        .bind(&request.logo_path)
        .bind(&request.address)
        .bind(&request.city)
        .bind(&request.municipality)
        .bind(&request.province)
        .bind(&request.phone_number)
        .bind(&request.email)
        .fetch_one(&mut *tx)
        .await?;

        let membership = sqlx::query_as::<_, MembershipRow>(
            r#"
            INSERT INTO store_memberships (user_id, store_id, role)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(store.id)
        .bind(Role::Owner.as_db_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((store.into(), membership.try_into()?))
    }

    #[instrument(skip(self), fields(store_id = %abbrev_uuid(&id)), err)]
    async fn get_store(&self, id: StoreId) -> Result<Option<StoreDBResponse>> {
        let row = sqlx::query_as::<_, StoreRow>("SELECT * FROM stores WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self, request), fields(store_id = %abbrev_uuid(&id)), err)]
    async fn update_store(&self, id: StoreId, request: &StoreUpdateDBRequest) -> Result<StoreDBResponse> {
        // Atomic update with conditional field updates
        let row = sqlx::query_as::<_, StoreRow>(
            r#"
            UPDATE stores SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                address = COALESCE($4, address),
                city = COALESCE($5, city),
                municipality = COALESCE($6, municipality),
                province = COALESCE($7, province),
                phone_number = COALESCE($8, phone_number),
                email = COALESCE($9, email)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(&request.address)
        .bind(&request.city)
        .bind(&request.municipality)
        .bind(&request.province)
        .bind(&request.phone_number)
        .bind(&request.email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(row.into())
    }

    #[instrument(skip(self), fields(store_id = %abbrev_uuid(&id)), err)]
    async fn delete_store(&self, id: StoreId) -> Result<bool> {
        // Explicit cascade: memberships first, then the store, one transaction.
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM store_memberships WHERE store_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM stores WHERE id = $1").bind(id).execute(&mut *tx).await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id), store_id = %abbrev_uuid(&store_id)), err)]
    async fn get_membership(&self, user_id: UserId, store_id: StoreId) -> Result<Option<MembershipDBResponse>> {
        let row = sqlx::query_as::<_, MembershipRow>("SELECT * FROM store_memberships WHERE user_id = $1 AND store_id = $2")
            .bind(user_id)
            .bind(store_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&request.user_id), store_id = %abbrev_uuid(&request.store_id)), err)]
    async fn create_membership(&self, request: &MembershipCreateDBRequest) -> Result<MembershipDBResponse> {
        // Bare insert: the composite primary key arbitrates duplicate
        // (user, store) pairs, including under concurrency.
        let row = sqlx::query_as::<_, MembershipRow>(
            r#"
            INSERT INTO store_memberships (user_id, store_id, role)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(request.user_id)
        .bind(request.store_id)
        .bind(request.role.as_db_str())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id), store_id = %abbrev_uuid(&store_id)), err)]
    async fn delete_membership(&self, user_id: UserId, store_id: StoreId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM store_memberships WHERE user_id = $1 AND store_id = $2")
            .bind(user_id)
            .bind(store_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
