//! # CLI Interface
//!
//! Defines the command-line argument structure for `trxgate-node` using
//! `clap` derive. Subcommands: `run`, `sign`, `version`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use trxgate_protocol::config::{DEFAULT_API_PORT, DEFAULT_METRICS_PORT, FRESHNESS_WINDOW_SECS};

/// trxgate partner transaction gateway.
///
/// Accepts signed transaction submissions from partners, checks their
/// structure, credentials, signature, amounts and freshness, and answers
/// with a success or failure result.
#[derive(Parser, Debug)]
#[command(
    name = "trxgate-node",
    about = "trxgate partner transaction gateway",
    version,
    propagate_version = true
)]
pub struct TrxgateCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the gateway.
    Run(RunArgs),
    /// Compute the `sig` value a partner would send for the given fields.
    Sign(SignArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Address to bind both listeners on.
    #[arg(long, env = "TRXGATE_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port for the submission API.
    #[arg(long, short = 'p', env = "TRXGATE_PORT", default_value_t = DEFAULT_API_PORT)]
    pub port: u16,

    /// Port for the Prometheus metrics endpoint.
    #[arg(long, env = "TRXGATE_METRICS_PORT", default_value_t = DEFAULT_METRICS_PORT)]
    pub metrics_port: u16,

    /// JSON file of partner credentials.
    ///
    /// When omitted, the built-in seed partners are used.
    #[arg(long, env = "TRXGATE_PARTNERS")]
    pub partners: Option<PathBuf>,

    /// Half-width of the accepted timestamp window, in seconds.
    #[arg(
        long,
        env = "TRXGATE_FRESHNESS_WINDOW_SECS",
        default_value_t = FRESHNESS_WINDOW_SECS
    )]
    pub freshness_window_secs: u64,

    /// Log output format: `pretty` or `json`.
    #[arg(long, env = "TRXGATE_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,
}

/// Arguments for the `sign` subcommand.
#[derive(Parser, Debug)]
pub struct SignArgs {
    /// Partner key (`partnerkey`).
    #[arg(long)]
    pub partner_key: String,

    /// Partner reference number (`partnerrefno`).
    #[arg(long)]
    pub partner_ref_no: String,

    /// Partner password (`partnerpassword`).
    #[arg(long, env = "TRXGATE_PARTNER_PASSWORD")]
    pub partner_password: String,

    /// Total amount in minor units (`totalamount`).
    #[arg(long)]
    pub total_amount: i64,

    /// ISO-8601 timestamp with offset. Defaults to the current time.
    #[arg(long)]
    pub timestamp: Option<String>,
}
