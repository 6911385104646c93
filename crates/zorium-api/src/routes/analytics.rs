//! Platform analytics: live totals, leaderboards, snapshot history.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use zorium_common::{
    error::ZoriumResult,
    models::stats::{PlatformStats, PlatformTotals, TopCreator, TopNft},
};
use zorium_db::repository::stats;

use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/analytics/overview", get(overview))
        .route("/analytics/top-nfts", get(top_nfts))
        .route("/analytics/top-creators", get(top_creators))
        .route("/analytics/history", get(history))
}

#[derive(Debug, Deserialize)]
struct LimitQuery {
    limit: Option<i64>,
}

impl LimitQuery {
    fn resolve(&self, default: i64) -> i64 {
        self.limit.unwrap_or(default).clamp(1, 100)
    }
}

#[derive(Serialize)]
struct Overview {
    #[serde(flatten)]
    totals: PlatformTotals,
    /// `total_volume` in whole units
    volume: String,
    /// `total_zrm_distributed` in whole ZRM
    zrm_distributed: String,
}

/// GET /api/v1/analytics/overview
async fn overview(State(state): State<Arc<AppState>>) -> ZoriumResult<Json<Overview>> {
    let totals = stats::totals(&state.db.pg).await?;
    Ok(Json(Overview {
        volume: super::format_zrm(&totals.total_volume),
        zrm_distributed: super::format_zrm(&totals.total_zrm_distributed),
        totals,
    }))
}

/// GET /api/v1/analytics/top-nfts
async fn top_nfts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> ZoriumResult<Json<Vec<TopNft>>> {
    Ok(Json(stats::top_nfts(&state.db.pg, query.resolve(10)).await?))
}

/// GET /api/v1/analytics/top-creators
async fn top_creators(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> ZoriumResult<Json<Vec<TopCreator>>> {
    Ok(Json(stats::top_creators(&state.db.pg, query.resolve(10)).await?))
}

/// GET /api/v1/analytics/history
async fn history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> ZoriumResult<Json<Vec<PlatformStats>>> {
    Ok(Json(stats::history(&state.db.pg, query.resolve(30)).await?))
}
