//! Health check endpoint for load balancers and monitoring.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_secs: u64,
    database: bool,
    chain: bool,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health_check))
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let (database, chain) = tokio::join!(
        zorium_db::postgres::health_check(&state.db.pg),
        state.chain.block_number(),
    );
    let chain = chain.is_ok();

    Json(HealthResponse {
        status: if database && chain { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started_at.elapsed().as_secs(),
        database,
        chain,
    })
}
