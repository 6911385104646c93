//! Platform analytics.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Daily snapshot of platform totals.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PlatformStats {
    pub id: Uuid,
    pub snapshot_date: NaiveDate,
    pub total_users: i64,
    pub total_nfts: i64,
    pub total_collections: i64,
    pub total_transactions: i64,
    pub total_volume: String,
    pub total_zrm_distributed: String,
    pub created_at: DateTime<Utc>,
}

/// Live totals computed on request.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PlatformTotals {
    pub total_users: i64,
    pub total_nfts: i64,
    pub total_collections: i64,
    pub total_transactions: i64,
    pub total_likes: i64,
    pub total_comments: i64,
    pub total_volume: String,
    pub total_zrm_distributed: String,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct TopNft {
    pub id: Uuid,
    pub name: String,
    pub image_url: String,
    pub like_count: i64,
    pub view_count: i64,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct TopCreator {
    pub id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
    pub nfts_created: i64,
    pub followers: i64,
}
