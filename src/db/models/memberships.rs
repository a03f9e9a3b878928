//! Database models for store memberships.

use chrono::{DateTime, Utc};

use crate::authz::Role;
use crate::types::{StoreId, UserId};

/// Database request for creating a membership row
#[derive(Debug, Clone)]
pub struct MembershipCreateDBRequest {
    pub user_id: UserId,
    pub store_id: StoreId,
    pub role: Role,
}

/// Database response for a membership row
#[derive(Debug, Clone)]
pub struct MembershipDBResponse {
    pub user_id: UserId,
    pub store_id: StoreId,
    pub role: Role,
    pub assigned_at: DateTime<Utc>,
}
