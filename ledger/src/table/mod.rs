//! # Table Boundary
//!
//! The ledger talks to its store through one narrow trait, [`Table`]: put an
//! item, get an item by key, scan a page. Everything above this module
//! (receipts, sums, listing) is written against the trait; everything below
//! it is a backend.
//!
//! ```text
//! attribute.rs  — AttributeValue, Item, Key
//! key.rs        — KeySchema and on-disk key encoding
//! filter.rs     — typed filter builder (Condition) and placeholder rendering
//! scan.rs       — ScanRequest, ScanPage, ScanPager
//! sled_table.rs — SledTable, the embedded backend
//! ```
//!
//! ## Paging Contract
//!
//! A scan request evaluates at most `min(limit, backend page cap)` items,
//! starting strictly after `exclusive_start_key`. Filtering happens after
//! evaluation, so a page can come back short or even empty while more data
//! remains; only the absence of `last_evaluated_key` means the scan is done.

pub mod attribute;
pub mod error;
pub mod filter;
pub mod key;
pub mod scan;
pub mod sled_table;

use std::sync::Arc;

pub use attribute::{AttributeValue, Item, Key};
pub use error::{TableError, TableResult};
pub use filter::{attr, Comparator, Condition, RenderedFilter};
pub use key::KeySchema;
pub use scan::{ScanPage, ScanPager, ScanRequest};
pub use sled_table::SledTable;

/// A key-value table with scan support.
///
/// Implementations must be safe to share across threads; the ledger never
/// holds a lock around calls into the table.
pub trait Table: Send + Sync {
    /// The primary-key layout of this table.
    fn key_schema(&self) -> &KeySchema;

    /// Unconditional upsert keyed by the item's primary-key attributes.
    fn put(&self, item: Item) -> TableResult<()>;

    /// Point lookup by primary key.
    fn get(&self, key: &Key) -> TableResult<Option<Item>>;

    /// Run one scan request and return one page.
    fn scan(&self, request: &ScanRequest) -> TableResult<ScanPage>;

    /// Lazily chain scan requests, one per page.
    fn scan_pages(&self, request: ScanRequest) -> ScanPager<'_, Self>
    where
        Self: Sized,
    {
        ScanPager::new(self, request)
    }
}

impl<T: Table + ?Sized> Table for Arc<T> {
    fn key_schema(&self) -> &KeySchema {
        (**self).key_schema()
    }

    fn put(&self, item: Item) -> TableResult<()> {
        (**self).put(item)
    }

    fn get(&self, key: &Key) -> TableResult<Option<Item>> {
        (**self).get(key)
    }

    fn scan(&self, request: &ScanRequest) -> TableResult<ScanPage> {
        (**self).scan(request)
    }
}
