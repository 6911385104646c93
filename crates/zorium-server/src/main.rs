//! # Zorium Server
//!
//! Single binary for the Zorium backend:
//! - `serve` (default): REST API
//! - `migrate`: apply database migrations and exit
//! - `sync-collections`: mirror factory collections into the database once

use std::net::SocketAddr;

use anyhow::Context;
use clap::{Parser, Subcommand};
use zorium_api::{AppState, build_router};
use zorium_db::Database;

#[derive(Debug, Parser)]
#[command(name = "zorium", version, about = "Zorium NFT marketplace backend")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "ZORIUM_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Run one collection sync against the configured factory and print the report
    SyncCollections,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "zorium=debug,tower_http=debug".into());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = zorium_common::config::init().context("loading configuration")?;
    init_tracing(cli.log_json);

    tracing::info!("Starting Zorium v{}", env!("CARGO_PKG_VERSION"));

    let db = Database::connect(config).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Migrate => {
            db.migrate().await?;
        }
        Command::SyncCollections => {
            let reader = zorium_chain::reader_from_config(&config.chain)?;
            let report =
                zorium_api::sync::sync_collections(&db, reader.as_ref(), config.chain.chain_id as i64)
                    .await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Serve => {
            db.migrate().await?;
            let chain = zorium_chain::reader_from_config(&config.chain)?;
            let router = build_router(AppState::new(db, chain));

            let addr = SocketAddr::new(
                config.server.host.parse().context("server.host")?,
                config.server.port,
            );
            let listener = tokio::net::TcpListener::bind(addr).await?;
            tracing::info!("REST API listening on http://{addr}");

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
            tracing::info!("Server stopped");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
