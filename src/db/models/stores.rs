//! Database models for stores.

use chrono::{DateTime, Utc};

use crate::types::StoreId;

/// Database request for creating a new store
#[derive(Debug, Clone, Default)]
pub struct StoreCreateDBRequest {
    pub name: String,
    pub description: Option<String>,
    pub logo_path: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub municipality: Option<String>,
    pub province: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
}

/// Database request for updating a store. Absent fields leave the stored
/// value untouched.
#[derive(Debug, Clone, Default)]
pub struct StoreUpdateDBRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub municipality: Option<String>,
    pub province: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
}

/// Database response for a store
#[derive(Debug, Clone)]
pub struct StoreDBResponse {
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
