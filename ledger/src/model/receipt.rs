//! Receipt records and the page cursor that points at one.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::item::PurchasedItem;

// ---------------------------------------------------------------------------
// Receipt
// ---------------------------------------------------------------------------

/// A persisted purchase.
///
/// `(customer_id, purchase_date)` is the primary key. `sales_total` is
/// computed once at creation and is the value range sums read; it is never
/// recomputed from `items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub customer_id: String,
    pub purchase_date: DateTime<Utc>,
    pub sales_total: Decimal,
    pub items: Vec<PurchasedItem>,
}

impl Receipt {
    /// The primary key of this receipt, usable as the exclusive start of
    /// the next listing page.
    pub fn cursor(&self) -> ReceiptCursor {
        ReceiptCursor {
            customer_id: self.customer_id.clone(),
            purchase_date: self.purchase_date,
        }
    }
}

// ---------------------------------------------------------------------------
// ReceiptCursor
// ---------------------------------------------------------------------------

/// Primary key of a receipt, detached from the rest of the record.
///
/// Listing resumes strictly after the receipt this cursor names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptCursor {
    pub customer_id: String,
    pub purchase_date: DateTime<Utc>,
}

impl ReceiptCursor {
    pub fn new(customer_id: impl Into<String>, purchase_date: DateTime<Utc>) -> Self {
        Self {
            customer_id: customer_id.into(),
            purchase_date,
        }
    }
}

// ---------------------------------------------------------------------------
// ReceiptPage
// ---------------------------------------------------------------------------

/// One page of a receipt listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptPage {
    /// Receipts in the table's scan order. Never longer than the requested
    /// limit.
    pub receipts: Vec<Receipt>,

    /// The table's own resume point. `None` means the scan reached the end
    /// of the table with this page.
    pub last_evaluated_key: Option<ReceiptCursor>,
}

impl ReceiptPage {
    /// Cursor for the next request: the last receipt returned, if any.
    pub fn next_cursor(&self) -> Option<ReceiptCursor> {
        self.receipts.last().map(Receipt::cursor)
    }

    pub fn len(&self) -> usize {
        self.receipts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receipts.is_empty()
    }
}
