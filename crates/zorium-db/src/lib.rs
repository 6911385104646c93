//! # zorium-db
//!
//! Database layer for Zorium. All relational data (users, NFTs, collections,
//! social graph, ZRM ledger) lives in PostgreSQL and is reached through the
//! repository functions in [`repository`].

pub mod postgres;
pub mod repository;

use anyhow::Result;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Shared database state passed through Axum extractors.
#[derive(Clone)]
pub struct Database {
    pub pg: PgPool,
}

impl Database {
    /// Connect to PostgreSQL.
    pub async fn connect(config: &zorium_common::config::AppConfig) -> Result<Self> {
        tracing::info!("Connecting to PostgreSQL...");
        let pg = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .min_connections(config.database.min_connections)
            .connect(&config.database.url)
            .await?;

        tracing::info!("Connected to PostgreSQL");

        Ok(Self { pg })
    }

    /// Build a pool that only opens connections when first used.
    pub fn connect_lazy(url: &str, acquire_timeout: std::time::Duration) -> Result<Self> {
        let pg = PgPoolOptions::new()
            .acquire_timeout(acquire_timeout)
            .connect_lazy(url)?;
        Ok(Self { pg })
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pg).await?;
        tracing::info!("Migrations complete");
        Ok(())
    }
}
