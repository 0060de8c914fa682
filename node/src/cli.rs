//! # CLI Interface
//!
//! Defines the command-line argument structure for `medledger-node` using
//! `clap` derive. Every `run` option can also come from the environment
//! (and therefore from a `.env` file loaded before parsing).

use std::net::SocketAddr;

use clap::{Parser, Subcommand, ValueEnum};
use thiserror::Error;

use medledger_protocol::config::DEFAULT_PORT;

/// MedLedger node.
///
/// Keeps an in-memory, hash-linked ledger of patient encounters and serves
/// it over HTTP.
#[derive(Parser, Debug)]
#[command(
    name = "medledger-node",
    about = "MedLedger encounter ledger node",
    version,
    propagate_version = true
)]
pub struct MedLedgerCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the node binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP node.
    Run(RunArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Listen address. A bare port (`8080`) or `:8080` binds all
    /// interfaces; `host:port` is used as given.
    #[arg(long, env = "ADDR", default_value_t = DEFAULT_PORT.to_string())]
    pub addr: String,

    /// Address for the Prometheus `/metrics` listener. Disabled when unset.
    #[arg(long, env = "METRICS_ADDR")]
    pub metrics_addr: Option<String>,

    /// Log output format.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormatArg::Pretty)]
    pub log_format: LogFormatArg,
}

/// `--log-format` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Json,
}

/// A listen address that could not be understood.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid listen address {0:?}: expected a port, :port, or host:port")]
pub struct AddrError(pub String);

/// Resolve an `ADDR`-style value into a socket address.
pub fn parse_listen_addr(raw: &str) -> Result<SocketAddr, AddrError> {
    let trimmed = raw.trim();
    let port_only = trimmed.strip_prefix(':').unwrap_or(trimmed);

    if let Ok(port) = port_only.parse::<u16>() {
        return Ok(SocketAddr::from(([0, 0, 0, 0], port)));
    }

    trimmed
        .parse::<SocketAddr>()
        .map_err(|_| AddrError(raw.to_string()))
}
