//! Marketplace transactions (mint, sale, transfer).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const TX_MINT: &str = "mint";
pub const TX_SALE: &str = "sale";
pub const TX_TRANSFER: &str = "transfer";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub nft_id: Uuid,
    pub from_user_id: Option<Uuid>,
    pub to_user_id: Option<Uuid>,
    pub kind: String,
    /// Base-unit decimal string
    pub price: Option<String>,
    pub tx_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub nft_id: Uuid,
    /// "sale" or "transfer"
    pub kind: String,
    /// Human-readable price, required for sales
    pub price: Option<String>,
    pub tx_hash: Option<String>,
    /// Receiving user for transfers; sales go to the caller
    pub to_user_id: Option<Uuid>,
}
