// ABOUTME: Server binary for the Fratelli confectionery backend
// ABOUTME: Loads configuration, initializes the database, and serves the HTTP API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fratelli Confeitaria

//! # Fratelli Server Binary
//!
//! Starts the inventory/recipe HTTP API with structured logging and a
//! SQLite-backed store.

use anyhow::Result;
use clap::Parser;
use fratelli_server::{
    config::ServerConfig,
    database::Database,
    logging,
    routes::{self, AppState},
};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "fratelli-server")]
#[command(about = "Fratelli confectionery backend - stock, recipes, and capability API")]
struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL (sqlite: only)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = &args.database_url {
        config.database_url = fratelli_server::config::DatabaseUrl::parse(database_url)?;
    }

    logging::init_from_env()?;

    info!("Starting Fratelli server");
    info!("{}", config.summary());

    let database = Database::new(&config.database_url.to_connection_string()).await?;
    info!("Database initialized and migrated");

    let state = Arc::new(AppState::new(database));
    let app = routes::router(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    display_available_endpoints(config.http_port);
    info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Resolve on ctrl-c so in-flight requests can drain
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install ctrl-c handler: {e}");
    }
    info!("Shutdown signal received");
}

/// Display all available API endpoints
fn display_available_endpoints(port: u16) {
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

    info!("=== Available API Endpoints ===");
    info!("Health:");
    info!("   Health Check:      GET  http://{host}:{port}/health");
    info!("Ingredients:");
    info!("   List Stock:        GET  http://{host}:{port}/ingredients");
    info!("   Create:            POST http://{host}:{port}/ingredients");
    info!("   Update:            PUT  http://{host}:{port}/ingredients/{{id}}");
    info!("   Soft Delete:       DELETE http://{host}:{port}/ingredients/{{id}}");
    info!("Recipes:");
    info!("   List:              GET  http://{host}:{port}/recipes");
    info!("   Create:            POST http://{host}:{port}/recipes");
    info!("   Get:               GET  http://{host}:{port}/recipes/{{id}}");
    info!("   Update:            PUT  http://{host}:{port}/recipes/{{id}}");
    info!("   Delete:            DELETE http://{host}:{port}/recipes/{{id}}");
    info!("   Prepare:           POST http://{host}:{port}/recipes/{{id}}/prepare");
    info!("Reports:");
    info!("   Stock:             GET  http://{host}:{port}/reports/stock");
    info!("   Capability:        GET  http://{host}:{port}/reports/capability");
    info!("   History:           GET  http://{host}:{port}/reports/history");
    info!("=== End of Endpoint List ===");
}
