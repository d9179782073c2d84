//! # Ledger Configuration & Constants
//!
//! Table layout, attribute names, and paging limits live here. The attribute
//! names are part of the stored record format; renaming one orphans every
//! record already written under the old name.

/// Version of the ledger library, reported by the node's `/status` and
/// `version` command.
pub const LEDGER_VERSION: &str = env!("CARGO_PKG_VERSION");

// ---------------------------------------------------------------------------
// Table Layout
// ---------------------------------------------------------------------------

/// Default name of the sled tree that holds receipt records.
pub const RECEIPTS_TABLE: &str = "receipts";

/// Partition key attribute. Together with [`ATTR_PURCHASE_DATE`] it forms
/// the primary key of a receipt record.
pub const ATTR_CUSTOMER_ID: &str = "customerId";

/// Sort key attribute, stored as canonical timestamp text.
pub const ATTR_PURCHASE_DATE: &str = "purchaseDate";

/// Pre-computed sum of item prices, stored as a numeric attribute.
pub const ATTR_SALES_TOTAL: &str = "salesTotal";

/// Encoded purchased-item list (one opaque text blob).
pub const ATTR_ITEMS: &str = "items";

// ---------------------------------------------------------------------------
// Paging
// ---------------------------------------------------------------------------

/// Upper bound on items a single scan request evaluates, regardless of the
/// caller's limit. Stands in for the per-response size cap of hosted
/// key-value stores, so multi-page scans happen on realistic data sizes.
pub const DEFAULT_MAX_PAGE_ITEMS: usize = 1_000;

/// Page size used by listing endpoints when the caller omits one.
pub const DEFAULT_PAGE_LIMIT: usize = 25;

/// Largest page a listing endpoint will hand out in one response.
pub const MAX_PAGE_LIMIT: usize = 500;

// ---------------------------------------------------------------------------
// LedgerConfig
// ---------------------------------------------------------------------------

/// Runtime knobs for opening a receipt table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Name of the sled tree backing the receipt table.
    pub table_name: String,

    /// Maximum number of items evaluated per scan request.
    pub max_page_items: usize,

    /// Flush to disk after every put. Off by default; sled flushes on its
    /// own schedule and on drop.
    pub flush_on_write: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            table_name: RECEIPTS_TABLE.to_string(),
            max_page_items: DEFAULT_MAX_PAGE_ITEMS,
            flush_on_write: false,
        }
    }
}

impl LedgerConfig {
    /// Same defaults with a different per-request page cap.
    pub fn with_max_page_items(max_page_items: usize) -> Self {
        Self {
            max_page_items,
            ..Default::default()
        }
    }
}
