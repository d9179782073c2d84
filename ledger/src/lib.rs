// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Scoop Ledger — Core Library
//!
//! Receipts for an ice-cream shop, kept in a key-value table that can only
//! be read back in pages. Totals are exact decimals and the item list
//! travels as one opaque text blob. The two read queries consume the same
//! paged scan in different ways.
//!
//! ## Architecture
//!
//! - **model** — Receipt, PurchasedItem, ReceiptCursor, ReceiptPage.
//! - **codec** — Item-list text codec and canonical timestamp text.
//! - **table** — The `Table` trait, typed scan filters, the page iterator,
//!   and the sled backend.
//! - **receipts** — `ReceiptStore`: create, range sum, one-page listing.
//! - **clock** — Where "now" comes from.
//! - **config** — Attribute names, paging limits, `LedgerConfig`.
//!
//! ## Ground Rules
//!
//! 1. Money is `Decimal`. Never a float, not even in transit.
//! 2. A scan is finished only when the table says so. A short page proves
//!    nothing.
//! 3. Listing makes one request. Summing makes as many as it takes.

pub mod clock;
pub mod codec;
pub mod config;
pub mod model;
pub mod receipts;
pub mod table;

pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::ItemListCodec;
pub use config::LedgerConfig;
pub use model::{PurchasedItem, Receipt, ReceiptCursor, ReceiptPage};
pub use receipts::{receipt_key_schema, ReceiptError, ReceiptResult, ReceiptStore};
pub use table::{SledTable, Table};

/// Open the receipt table at `path` and wrap it in a store using wall-clock
/// time.
pub fn open_receipt_store<P: AsRef<std::path::Path>>(
    path: P,
    config: &LedgerConfig,
) -> ReceiptResult<ReceiptStore<SledTable>> {
    let table = SledTable::open(path, receipt_key_schema(), config)?;
    Ok(ReceiptStore::new(table))
}
