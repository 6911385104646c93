//! NFT listings and the on-chain tokens they may point at.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// An NFT listed on the marketplace.
///
/// `price` is a base-unit decimal string (NUMERIC in Postgres).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Nft {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub image_url: String,
    pub metadata_url: Option<String>,
    pub price: Option<String>,
    pub is_listed: bool,
    pub creator_id: Uuid,
    pub owner_id: Uuid,
    pub collection_id: Option<Uuid>,
    pub token_ref: Option<Uuid>,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A token read from an ERC-1155 collection contract.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct NftToken {
    pub id: Uuid,
    pub collection_id: Uuid,
    /// uint256 token id as decimal string
    pub token_id: String,
    pub metadata_uri: Option<String>,
    /// uint256 supply as decimal string
    pub total_supply: String,
    pub synced_at: DateTime<Utc>,
}

/// NFT with engagement counters, as returned by detail endpoints.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct NftDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub nft: Nft,
    pub like_count: i64,
    pub comment_count: i64,
    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liked_by_me: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateNftRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(url(message = "Invalid image URL"))]
    pub image_url: String,

    #[validate(url(message = "Invalid metadata URL"))]
    pub metadata_url: Option<String>,

    /// Human-readable price in ETH-style units, e.g. "0.25"
    pub price: Option<String>,

    pub collection_id: Option<Uuid>,

    /// On-chain token id inside `collection_id`
    pub token_id: Option<String>,

    #[serde(default)]
    pub is_listed: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateNftRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    pub price: Option<String>,

    pub is_listed: Option<bool>,
}

/// Sort orders accepted by `GET /nfts`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NftSort {
    #[default]
    Newest,
    Oldest,
    PriceAsc,
    PriceDesc,
    Popular,
}

impl NftSort {
    /// ORDER BY clause for the `n` alias. Values are fixed strings, never user input.
    pub fn order_by(self) -> &'static str {
        match self {
            Self::Newest => "n.created_at DESC",
            Self::Oldest => "n.created_at ASC",
            Self::PriceAsc => "n.price ASC NULLS LAST, n.created_at DESC",
            Self::PriceDesc => "n.price DESC NULLS LAST, n.created_at DESC",
            Self::Popular => "like_count DESC, n.view_count DESC, n.created_at DESC",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NftFilter {
    pub collection_id: Option<Uuid>,
    pub creator_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
    pub listed: Option<bool>,
    #[serde(default)]
    pub sort: NftSort,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_parses_snake_case() {
        let sort: NftSort = serde_json::from_str("\"price_desc\"").unwrap();
        assert_eq!(sort, NftSort::PriceDesc);
        assert_eq!(NftSort::default(), NftSort::Newest);
    }

    #[test]
    fn popular_orders_by_likes() {
        assert!(NftSort::Popular.order_by().starts_with("like_count DESC"));
    }

    #[test]
    fn create_request_requires_image_url() {
        let req = CreateNftRequest {
            name: "Sunrise".into(),
            description: None,
            image_url: "not a url".into(),
            metadata_url: None,
            price: None,
            collection_id: None,
            token_id: None,
            is_listed: false,
        };
        assert!(req.validate().is_err());
    }
}
