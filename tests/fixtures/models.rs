use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A pet in the store
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: i64,
    pub name: String,
    pub category: Option<Category>,
    pub photo_urls: Vec<String>,
    pub labels: HashMap<String, String>,
    pub status: PetStatus,
    /// Thumbnail image
    pub thumbnail: Vec<u8>,
    #[serde(flatten)]
    pub audit: Audit,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Audit {
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetStatus {
    Available,
    Pending,
    Sold,
}

/// Categories nest arbitrarily deep
#[derive(Debug, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub children: Vec<Category>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

pub type PetId = i64;

#[derive(Debug)]
pub struct FindPets {
    #[schema(param = "query=limit;default=20;description=page size")]
    pub limit: u32,
    #[schema(param = "header=X-Request-Id")]
    pub request_id: Option<String>,
}

pub mod errors {
    #[derive(Debug, serde::Serialize)]
    pub struct ApiError {
        pub code: i32,
        #[schema(description = "human readable message")]
        pub message: String,
    }
}
