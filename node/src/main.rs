// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Scoop Node
//!
//! Entry point for the `scoop-node` binary. Parses CLI arguments, initializes
//! logging and metrics, opens the receipt store, and either serves the HTTP
//! API or runs a single ledger operation and prints the result as JSON.
//!
//! The binary supports five subcommands:
//!
//! - `run`     — serve the REST API and the metrics endpoint
//! - `create`  — record one purchase
//! - `sales`   — sum sales over an inclusive date range
//! - `list`    — list receipts a page at a time
//! - `version` — print build version information

mod api;
mod cli;
mod logging;
mod metrics;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::sync::Arc;
use tokio::signal;

use scoop_ledger::config::LEDGER_VERSION;
use scoop_ledger::{
    open_receipt_store, ItemListCodec, LedgerConfig, ReceiptCursor, ReceiptStore, SledTable,
};

use cli::{Commands, ScoopNodeCli, StoreArgs};
use metrics::NodeMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = ScoopNodeCli::parse();

    match cli.command {
        Commands::Run(args) => run_node(args).await,
        Commands::Create(args) => create_receipt(args),
        Commands::Sales(args) => sum_sales(args),
        Commands::List(args) => list_receipts(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Opens (creating if needed) the receipt store under the data directory.
fn open_store(args: &StoreArgs) -> Result<ReceiptStore<SledTable>> {
    let data_dir = &args.data_dir;
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create data directory: {}", data_dir.display()))?;

    let config = LedgerConfig {
        max_page_items: args.max_page_items,
        flush_on_write: args.flush_on_write,
        ..LedgerConfig::default()
    };
    let store = open_receipt_store(data_dir, &config)
        .with_context(|| format!("failed to open receipt store at {}", data_dir.display()))?;
    tracing::info!(
        path = %data_dir.display(),
        receipts = store.receipt_count(),
        "receipt store opened"
    );
    Ok(store)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Serves the REST API and the metrics endpoint until shutdown.
async fn run_node(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(logging::DEFAULT_DIRECTIVES, args.store.log_format);

    tracing::info!(
        rpc_port = args.rpc_port,
        metrics_port = args.metrics_port,
        page_size = args.page_size,
        data_dir = %args.store.data_dir.display(),
        "starting scoop-node"
    );

    let store = open_store(&args.store)?;
    let node_metrics = Arc::new(NodeMetrics::new().context("failed to register metrics")?);

    let app_state = api::AppState {
        version: format!(
            "{} (ledger {})",
            env!("CARGO_PKG_VERSION"),
            LEDGER_VERSION
        ),
        store: store.clone(),
        default_page_size: args.page_size,
        metrics: Arc::clone(&node_metrics),
    };

    // --- API server ---
    let api_router = api::create_router(app_state);
    let api_addr = format!("0.0.0.0:{}", args.rpc_port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind RPC listener on {}", api_addr))?;
    tracing::info!("API server listening on {}", api_addr);

    // --- Metrics server ---
    let metrics_router = axum::Router::new()
        .route("/metrics", axum::routing::get(metrics::metrics_handler))
        .with_state(Arc::clone(&node_metrics));
    let metrics_addr = format!("0.0.0.0:{}", args.metrics_port);
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {}", metrics_addr))?;
    tracing::info!("Metrics server listening on {}", metrics_addr);

    // --- Serve ---
    tokio::select! {
        res = axum::serve(api_listener, api_router) => {
            if let Err(e) = res {
                tracing::error!("API server error: {}", e);
            }
        }
        res = axum::serve(metrics_listener, metrics_router) => {
            if let Err(e) = res {
                tracing::error!("Metrics server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received, draining connections");
        }
    }

    store
        .table()
        .flush()
        .context("failed to flush receipt store")?;
    tracing::info!("scoop-node stopped");
    Ok(())
}

/// Records one purchase and prints the stored receipt.
fn create_receipt(args: cli::CreateArgs) -> Result<()> {
    logging::init_logging("scoop_node=info,scoop_ledger=info", args.store.log_format);

    let items = ItemListCodec
        .decode(args.items.as_deref())
        .context("--items is not a valid item list")?;
    let store = open_store(&args.store)?;

    let receipt = store
        .create_receipt(&args.customer, items)
        .context("failed to create receipt")?;
    store.table().flush().context("failed to flush receipt store")?;

    print_json(&receipt)
}

/// Prints the total of all sales in `[from, to]`.
fn sum_sales(args: cli::SalesArgs) -> Result<()> {
    logging::init_logging("scoop_node=info,scoop_ledger=info", args.store.log_format);

    let store = open_store(&args.store)?;
    let total = store
        .get_sales_between_dates(args.from, args.to)
        .context("failed to sum sales")?;

    print_json(&serde_json::json!({
        "from": args.from,
        "to": args.to,
        "total": total,
    }))
}

/// Prints one page of receipts, or every page with `--all`.
fn list_receipts(args: cli::ListArgs) -> Result<()> {
    logging::init_logging("scoop_node=info,scoop_ledger=info", args.store.log_format);

    let store = open_store(&args.store)?;
    let mut cursor = match (args.after_customer, args.after_date) {
        (Some(customer_id), Some(purchase_date)) => {
            Some(ReceiptCursor::new(customer_id, purchase_date))
        }
        _ => None,
    };

    loop {
        let page = store
            .get_receipts_paginated(args.page_size, cursor.as_ref())
            .context("failed to list receipts")?;
        print_json(&page)?;

        match page.last_evaluated_key {
            Some(next) if args.all => cursor = Some(next),
            _ => return Ok(()),
        }
    }
}

/// Prints version information to stdout.
fn print_version() {
    println!("scoop-node {}", env!("CARGO_PKG_VERSION"));
    println!("ledger     {}", LEDGER_VERSION);
    println!("rustc      {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
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
}
