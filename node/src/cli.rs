//! # CLI Interface
//!
//! Defines the command-line argument structure for `scoop-node` using
//! `clap` derive. Supports five subcommands: `run`, `create`, `sales`,
//! `list`, and `version`. Every flag that touches the store can also be set
//! through a `SCOOP_*` environment variable.

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use scoop_ledger::codec::timestamp;
use scoop_ledger::config::{DEFAULT_MAX_PAGE_ITEMS, DEFAULT_PAGE_LIMIT};

use crate::logging::LogFormat;

/// Scoop receipt ledger node.
///
/// Records ice-cream shop receipts in an embedded table, answers sales
/// range sums, and lists receipts a page at a time. `run` serves all of it
/// over HTTP; the other subcommands work directly on a data directory.
#[derive(Parser, Debug)]
#[command(
    name = "scoop-node",
    about = "Scoop receipt ledger node",
    version,
    propagate_version = true
)]
pub struct ScoopNodeCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the scoop node binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the HTTP API and the metrics endpoint.
    Run(RunArgs),
    /// Record one purchase.
    Create(CreateArgs),
    /// Sum sales between two instants, both inclusive.
    Sales(SalesArgs),
    /// List receipts one page at a time.
    List(ListArgs),
    /// Print version information and exit.
    Version,
}

/// Flags shared by every subcommand that opens the store.
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Directory holding the receipt database. Created if missing.
    #[arg(long, short = 'd', env = "SCOOP_DATA_DIR", default_value = "scoop-data")]
    pub data_dir: PathBuf,

    /// Most items a single scan request may evaluate.
    #[arg(long, env = "SCOOP_MAX_PAGE_ITEMS", default_value_t = DEFAULT_MAX_PAGE_ITEMS)]
    pub max_page_items: usize,

    /// Flush the database to disk after every write.
    #[arg(long, env = "SCOOP_FLUSH_ON_WRITE")]
    pub flush_on_write: bool,

    /// Log output format.
    #[arg(long, env = "SCOOP_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Port for the REST API.
    #[arg(long, env = "SCOOP_RPC_PORT", default_value_t = 9851)]
    pub rpc_port: u16,

    /// Port for the Prometheus metrics endpoint.
    #[arg(long, env = "SCOOP_METRICS_PORT", default_value_t = 9852)]
    pub metrics_port: u16,

    /// Page size used by `GET /receipts` when the request names none.
    #[arg(long, env = "SCOOP_PAGE_SIZE", default_value_t = DEFAULT_PAGE_LIMIT)]
    pub page_size: usize,
}

/// Arguments for the `create` subcommand.
#[derive(Args, Debug)]
pub struct CreateArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Customer the receipt belongs to.
    #[arg(long)]
    pub customer: String,

    /// Purchased items as a JSON list, e.g.
    /// `[{"name":"Cone","price":"2.50","flavors":["mint"]}]`.
    /// Omit for a purchase with no items.
    #[arg(long)]
    pub items: Option<String>,
}

/// Arguments for the `sales` subcommand.
#[derive(Args, Debug)]
pub struct SalesArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Start of the range (RFC 3339).
    #[arg(long, value_parser = parse_instant)]
    pub from: DateTime<Utc>,

    /// End of the range (RFC 3339).
    #[arg(long, value_parser = parse_instant)]
    pub to: DateTime<Utc>,
}

/// Arguments for the `list` subcommand.
#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Receipts per page.
    #[arg(long, env = "SCOOP_PAGE_SIZE", default_value_t = DEFAULT_PAGE_LIMIT)]
    pub page_size: usize,

    /// Resume after the receipt of this customer. Requires `--after-date`.
    #[arg(long, requires = "after_date")]
    pub after_customer: Option<String>,

    /// Resume after the receipt at this instant. Requires `--after-customer`.
    #[arg(long, requires = "after_customer", value_parser = parse_instant)]
    pub after_date: Option<DateTime<Utc>>,

    /// Keep requesting pages until the table is exhausted.
    #[arg(long)]
    pub all: bool,
}

fn parse_instant(text: &str) -> Result<DateTime<Utc>, String> {
    timestamp::from_text(text).map_err(|e| e.to_string())
}
