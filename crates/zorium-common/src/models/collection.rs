//! Collection model: an ERC-1155 contract known to the marketplace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Collection {
    pub id: Uuid,
    /// Contract address, lowercase hex
    pub contract_address: String,
    pub name: String,
    pub symbol: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub creator_id: Option<Uuid>,
    pub chain_id: i64,
    pub token_count: i64,
    pub is_verified: bool,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Register an already-deployed collection contract.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCollectionRequest {
    pub contract_address: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(url)]
    pub image_url: Option<String>,
}

/// Outcome of one collection sync run.
#[derive(Debug, Default, Clone, Serialize, PartialEq, Eq)]
pub struct SyncReport {
    pub collections_seen: usize,
    pub collections_upserted: usize,
    pub tokens_upserted: usize,
    pub failures: Vec<String>,
}
