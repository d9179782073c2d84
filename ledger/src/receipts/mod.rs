//! # Receipts
//!
//! Receipt persistence and the two scan-based queries over it.
//!
//! ```text
//! store.rs   — ReceiptStore: create, range sum, one-page listing, lookup
//! record.rs  — Receipt <-> table item mapping
//! error.rs   — ReceiptError
//! ```

pub mod error;
pub mod record;
pub mod store;

pub use error::{ReceiptError, ReceiptResult};
pub use record::receipt_key_schema;
pub use store::ReceiptStore;
