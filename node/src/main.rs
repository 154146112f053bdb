// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # trxgate Gateway Node
//!
//! Entry point for the `trxgate-node` binary. Parses CLI arguments,
//! initializes logging and metrics, loads the partner directory, and serves
//! the submission API.
//!
//! The binary supports three subcommands:
//!
//! - `run`: start the gateway
//! - `sign`: compute a partner signature for given fields
//! - `version`: print build version information

mod api;
mod cli;
mod logging;
mod metrics;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

use trxgate_protocol::directory::InMemoryPartnerDirectory;
use trxgate_protocol::message::{format_timestamp, TransactionRequest};
use trxgate_protocol::pipeline::{PipelineConfig, TransactionPipeline};

use cli::{Commands, TrxgateCli};
use logging::LogFormat;
use metrics::GatewayMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = TrxgateCli::parse();

    match cli.command {
        Commands::Run(args) => run_gateway(args).await,
        Commands::Sign(args) => sign_fields(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Starts the gateway: submission API and metrics endpoint.
async fn run_gateway(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(
        logging::DEFAULT_DIRECTIVES,
        LogFormat::from_str_lossy(&args.log_format),
    );

    tracing::info!(
        host = %args.host,
        port = args.port,
        metrics_port = args.metrics_port,
        freshness_window_secs = args.freshness_window_secs,
        "starting trxgate-node"
    );

    // --- Partner directory ---
    let directory = load_directory(args.partners.as_deref())?;
    let partner_count = directory.len();

    // --- Pipeline ---
    let pipeline = Arc::new(TransactionPipeline::with_config(
        Arc::new(directory),
        PipelineConfig {
            freshness_window: Duration::from_secs(args.freshness_window_secs),
        },
    ));

    // --- Metrics ---
    let gateway_metrics =
        Arc::new(GatewayMetrics::new().context("failed to register prometheus metrics")?);

    // --- Application state ---
    let app_state = api::AppState {
        version: format!(
            "{} (protocol {})",
            env!("CARGO_PKG_VERSION"),
            trxgate_protocol::config::PROTOCOL_VERSION,
        ),
        pipeline,
        metrics: Arc::clone(&gateway_metrics),
        partner_count,
    };

    // --- API server ---
    let api_router = api::create_router(app_state);
    let api_addr = format!("{}:{}", args.host, args.port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind API listener on {}", api_addr))?;
    tracing::info!("API server listening on {}", api_addr);

    // --- Metrics server ---
    let metrics_router = axum::Router::new()
        .route("/metrics", axum::routing::get(metrics::metrics_handler))
        .with_state(Arc::clone(&gateway_metrics));
    let metrics_addr = format!("{}:{}", args.host, args.metrics_port);
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {}", metrics_addr))?;
    tracing::info!("Metrics server listening on {}", metrics_addr);

    // --- Serve ---
    tokio::select! {
        res = axum::serve(api_listener, api_router)
            .with_graceful_shutdown(shutdown_signal()) => {
            if let Err(e) = res {
                tracing::error!("API server error: {}", e);
            }
        }
        res = axum::serve(metrics_listener, metrics_router) => {
            if let Err(e) = res {
                tracing::error!("Metrics server error: {}", e);
            }
        }
    }

    tracing::info!("trxgate-node stopped");
    Ok(())
}

/// Partners from `path`, or the built-in seed when no file is given.
fn load_directory(path: Option<&Path>) -> Result<InMemoryPartnerDirectory> {
    match path {
        Some(path) => InMemoryPartnerDirectory::load(path)
            .with_context(|| format!("failed to load partners from {}", path.display())),
        None => {
            tracing::warn!("no partner file given, using built-in seed partners");
            Ok(InMemoryPartnerDirectory::seeded())
        }
    }
}

/// Prints the `sig` value for the given fields, as partner tooling computes it.
fn sign_fields(args: cli::SignArgs) -> Result<()> {
    let timestamp = args
        .timestamp
        .unwrap_or_else(|| format_timestamp(&chrono::Utc::now()));

    let mut req = TransactionRequest {
        partner_key: args.partner_key,
        partner_ref_no: args.partner_ref_no,
        partner_password: args.partner_password,
        total_amount: args.total_amount,
        timestamp,
        ..Default::default()
    };
    req.sign().context("cannot sign request")?;

    println!("timestamp : {}", req.timestamp);
    println!("sig       : {}", req.signature);
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("trxgate-node {}", env!("CARGO_PKG_VERSION"));
    println!("protocol     {}", trxgate_protocol::config::PROTOCOL_VERSION);
    println!("rustc        {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported. If a handler cannot be
/// installed, that signal source is ignored.
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
            Ok(mut stream) => {
                stream.recv().await;
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
