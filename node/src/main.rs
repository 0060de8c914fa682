// Copyright (c) 2026 MedLedger Contributors. MIT License.
// See LICENSE for details.

//! # MedLedger Node
//!
//! Entry point for the `medledger-node` binary. Loads `.env`, parses CLI
//! arguments, initializes logging and metrics, creates the ledger with its
//! genesis block, and serves the HTTP gateway until interrupted.
//!
//! - `run`:     start the node
//! - `version`: print build version information

mod api;
mod cli;
mod form;
mod logging;
mod metrics;
mod page;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;

use medledger_protocol::storage::Ledger;

use cli::{Commands, MedLedgerCli};
use logging::LogFormat;
use metrics::NodeMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    // Must run before parsing so `.env` values feed clap's `env` fallbacks.
    let dotenv = dotenvy::dotenv();

    let cli = MedLedgerCli::parse();

    match cli.command {
        Commands::Run(args) => run_node(args, dotenv).await,
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Starts the node: ledger, gateway, and optional metrics listener.
async fn run_node(
    args: cli::RunArgs,
    dotenv: Result<std::path::PathBuf, dotenvy::Error>,
) -> Result<()> {
    logging::init_logging(logging::DEFAULT_FILTER, LogFormat::from(args.log_format))
        .context("failed to initialize logging")?;

    match dotenv {
        Ok(path) => tracing::info!(path = %path.display(), "loaded environment file"),
        Err(e) if e.not_found() => tracing::debug!("no .env file found"),
        Err(e) => tracing::warn!("ignoring unreadable .env file: {}", e),
    }

    let addr = cli::parse_listen_addr(&args.addr)?;

    // --- Ledger ---
    let ledger = Arc::new(Ledger::new());
    let genesis = ledger.tip().context("ledger constructed without genesis")?;
    tracing::info!(
        index = genesis.index,
        timestamp = %genesis.timestamp,
        hash = %genesis.hash,
        "genesis block created"
    );

    // --- Metrics ---
    let node_metrics = Arc::new(NodeMetrics::new().context("failed to register metrics")?);

    // --- Application state ---
    let app_state = api::AppState::new(
        format!(
            "{} (protocol {})",
            env!("CARGO_PKG_VERSION"),
            medledger_protocol::config::PROTOCOL_VERSION,
        ),
        ledger,
        Arc::clone(&node_metrics),
    );

    // --- API server ---
    let api_router = api::create_router(app_state);
    let api_listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind HTTP listener on {}", addr))?;
    tracing::info!("listening on {}", addr);

    // --- Metrics server ---
    let metrics_server = match args.metrics_addr.as_deref() {
        Some(raw) => {
            let metrics_addr = cli::parse_listen_addr(raw)?;
            let metrics_router = axum::Router::new()
                .route("/metrics", axum::routing::get(metrics::metrics_handler))
                .with_state(Arc::clone(&node_metrics));
            let listener = tokio::net::TcpListener::bind(metrics_addr)
                .await
                .with_context(|| {
                    format!("failed to bind metrics listener on {}", metrics_addr)
                })?;
            tracing::info!("metrics server listening on {}", metrics_addr);
            Some(tokio::spawn(async move {
                if let Err(e) = axum::serve(listener, metrics_router).await {
                    tracing::error!("metrics server error: {}", e);
                }
            }))
        }
        None => None,
    };

    // --- Serve ---
    axum::serve(api_listener, api_router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    if let Some(handle) = metrics_server {
        handle.abort();
    }
    tracing::info!("medledger-node stopped");
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("medledger-node {}", env!("CARGO_PKG_VERSION"));
    println!("protocol       {}", medledger_protocol::config::PROTOCOL_VERSION);
    println!("hash           {}", medledger_protocol::config::HASH_ALGORITHM);
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("shutdown signal received, draining connections");
}
