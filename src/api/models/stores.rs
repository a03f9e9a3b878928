//! API request/response models for stores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::models::stores::{StoreDBResponse, StoreUpdateDBRequest};
use crate::types::StoreId;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoreResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: StoreId,
    pub name: String,
    pub description: Option<String>,
    pub logo_path: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub municipality: Option<String>,
    pub province: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<StoreDBResponse> for StoreResponse {
    fn from(db: StoreDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            description: db.description,
            logo_path: db.logo_path,
            address: db.address,
            city: db.city,
            municipality: db.municipality,
            province: db.province,
            phone_number: db.phone_number,
            email: db.email,
            created_at: db.created_at,
        }
    }
}

/// Partial store update. Absent fields are no-ops, not "set to empty".
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateStoreRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub municipality: Option<String>,
    pub province: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
}

impl From<UpdateStoreRequest> for StoreUpdateDBRequest {
    fn from(api: UpdateStoreRequest) -> Self {
        Self {
            name: api.name,
            description: api.description,
            address: api.address,
            city: api.city,
            municipality: api.municipality,
            province: api.province,
            phone_number: api.phone_number,
            email: api.email,
        }
    }
}
