//! API request/response models for store workers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::authz::Role;
use crate::db::models::memberships::MembershipDBResponse;
use crate::types::{StoreId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddWorkerRequest {
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MembershipResponse {
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    #[schema(value_type = String, format = "uuid")]
    pub store_id: StoreId,
    pub role: Role,
    pub assigned_at: DateTime<Utc>,
}

impl From<MembershipDBResponse> for MembershipResponse {
    fn from(db: MembershipDBResponse) -> Self {
        Self {
            user_id: db.user_id,
            store_id: db.store_id,
            role: db.role,
            assigned_at: db.assigned_at,
        }
    }
}
