//! # zorium-api
//!
//! REST API layer for Zorium. Every route is served under `/api/v1` and
//! mirrored under `/api` for clients that call unversioned paths.

pub mod auth;
pub mod email;
pub mod middleware;
pub mod routes;
pub mod sync;
pub mod wheel;

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use zorium_chain::{ChainReader, NonceStore};
use zorium_db::Database;

use crate::email::EmailService;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// On-chain reads (RPC node or the in-memory mock).
    pub chain: Arc<dyn ChainReader>,
    /// Pending wallet sign-in challenges.
    pub nonces: Arc<NonceStore>,
    pub email: EmailService,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(db: Database, chain: Arc<dyn ChainReader>) -> Self {
        let config = zorium_common::config::get();
        Self {
            db,
            chain,
            nonces: Arc::new(NonceStore::new(config.auth.nonce_ttl_secs)),
            email: EmailService::from_config(&config.email),
            started_at: Instant::now(),
        }
    }
}

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(routes::auth::router())
        .merge(routes::users::router())
        .merge(routes::nfts::router())
        .merge(routes::collections::router())
        .merge(routes::social::router())
        .merge(routes::transactions::router())
        .merge(routes::notifications::router())
        .merge(routes::search::router())
        .merge(routes::analytics::router())
        .merge(routes::wheel::router())
        .merge(routes::admin::router())
        .merge(routes::health::router());

    Router::new()
        .nest("/api/v1", api_routes.clone())
        .nest("/api", api_routes)
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(cors_layer(&zorium_common::config::get().server.cors_origin))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower_http::compression::CompressionLayer::new())
        .with_state(Arc::new(state))
}

/// `*` allows any origin; otherwise a comma-separated list of origins.
fn cors_layer(origins: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.trim() == "*" {
        return layer.allow_origin(Any);
    }

    let list: Vec<HeaderValue> = origins
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(list))
}
