// ABOUTME: HTTP server entry point for the Yorist recipe book API
// ABOUTME: Loads configuration, connects the store and serves the axum router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

//! # Yorist Server Binary
//!
//! Serves the REST API and the SSE change stream until Ctrl+C or SIGTERM.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use yorist::{
    config::{environment::ServerConfig, DatabaseUrl},
    database_plugins::factory,
    logging,
    resources::ServerResourcesBuilder,
    routes,
};

#[derive(Parser)]
#[command(name = "yorist-server")]
#[command(about = "Yorist recipe book API server")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    port: Option<u16>,

    /// Override database URL (`sqlite:<path>` or `memory://`)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(port) = args.port {
        config.http_port = port;
    }
    if let Some(database_url) = args.database_url {
        config.database_url = DatabaseUrl::parse_url(&database_url)?;
    }
    config.validate()?;

    logging::init_from_env()?;
    info!("Starting Yorist server");
    info!("{}", config.summary());

    let database = factory::connect(&config.database_url.to_string())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open database: {e}"))?;
    info!("Database ready ({})", database.backend_name());

    let address = config.bind_address();
    let resources = ServerResourcesBuilder::new()
        .with_config(Arc::new(config))
        .with_database(database)
        .build_arc()
        .map_err(anyhow::Error::msg)?;

    let app = routes::router(resources);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
