// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Tracker Server - Issue Tracking HTTP API
//!
//! An HTTP server responsible for:
//! - Issue CRUD (create, retrieve, update, delete)
//! - Filtered queries (by status, by priority range)
//! - Append-only comments on issues

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use tracker_server::config::Config;
use tracker_server::handlers::AppState;
use tracker_server::storage::PgStorage;
use tracker_server::{migrations, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tracker_server=info".into()),
        )
        .init();

    // Load .env file if present
    if let Err(e) = dotenvy::dotenv() {
        warn!("No .env file loaded: {}", e);
    }

    // Load configuration
    let config = Config::from_env()?;

    info!(http_addr = %config.http_addr, "Starting Tracker Server");

    // Connect to database
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;

    info!("Connected to database");

    migrations::run(&pool).await?;

    info!("Database schema verified");

    let storage = Arc::new(PgStorage::new(pool));
    let state = AppState::new(storage);

    let listener = TcpListener::bind(config.http_addr).await?;

    server::serve(listener, state).await?;

    info!("Tracker Server shut down");

    Ok(())
}
