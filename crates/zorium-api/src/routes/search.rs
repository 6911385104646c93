//! Case-insensitive substring search over NFTs, users and collections.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use zorium_common::{
    error::{ZoriumError, ZoriumResult},
    models::{collection::Collection, nft::Nft, user::UserResponse},
};
use zorium_db::postgres::like_pattern;
use zorium_db::repository::{collections, nfts, users};

use crate::AppState;

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 50;
const MAX_QUERY_CHARS: usize = 100;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/search", get(search))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    All,
    Nfts,
    Users,
    Collections,
}

impl SearchType {
    fn includes(self, other: SearchType) -> bool {
        self == SearchType::All || self == other
    }
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    q: String,
    #[serde(default, rename = "type")]
    kind: SearchType,
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
struct SearchResults {
    query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    nfts: Option<Vec<Nft>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    users: Option<Vec<UserResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    collections: Option<Vec<Collection>>,
}

/// Trim and bound-check the query text.
fn normalize_query(raw: &str) -> ZoriumResult<&str> {
    let q = raw.trim();
    let len = q.chars().count();
    if len == 0 || len > MAX_QUERY_CHARS {
        return Err(ZoriumError::validation(format!(
            "Search query must be 1-{MAX_QUERY_CHARS} characters"
        )));
    }
    Ok(q)
}

/// GET /api/v1/search?q=&type=all|nfts|users|collections&limit=
async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> ZoriumResult<Json<SearchResults>> {
    let q = normalize_query(&query.q)?;
    let pattern = like_pattern(q);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let pool = &state.db.pg;

    let nfts = if query.kind.includes(SearchType::Nfts) {
        Some(nfts::search(pool, &pattern, limit).await?)
    } else {
        None
    };
    let users = if query.kind.includes(SearchType::Users) {
        Some(
            users::search(pool, &pattern, limit)
                .await?
                .into_iter()
                .map(Into::into)
                .collect(),
        )
    } else {
        None
    };
    let collections = if query.kind.includes(SearchType::Collections) {
        Some(collections::search(pool, &pattern, limit).await?)
    } else {
        None
    };

    Ok(Json(SearchResults {
        query: q.to_string(),
        nfts,
        users,
        collections,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_is_trimmed() {
        assert_eq!(normalize_query("  ape  ").unwrap(), "ape");
    }

    #[test]
    fn empty_and_oversized_queries_are_rejected() {
        assert!(normalize_query("   ").is_err());
        assert!(normalize_query(&"x".repeat(101)).is_err());
        assert!(normalize_query(&"é".repeat(100)).is_ok());
    }

    #[test]
    fn type_all_includes_everything() {
        assert!(SearchType::All.includes(SearchType::Users));
        assert!(SearchType::Nfts.includes(SearchType::Nfts));
        assert!(!SearchType::Nfts.includes(SearchType::Collections));
    }
}
