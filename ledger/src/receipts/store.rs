//! # ReceiptStore
//!
//! Creates receipts and answers the two scan-based queries. Both queries run
//! on the same [`ScanPager`](crate::table::ScanPager) primitive and differ
//! only in how much of it they consume:
//!
//! - [`ReceiptStore::get_sales_between_dates`] drains the pager, following
//!   every resume key until the table reports the end, and folds the stored
//!   totals into one sum.
//! - [`ReceiptStore::get_receipts_paginated`] takes exactly one page and
//!   hands the resume point back to the caller.
//!
//! Range sums are full-table scans with a filter evaluated inside the table.
//! They cost one request per page of the *whole* table, not per matching
//! receipt; callers that need frequent range sums should pre-aggregate.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::codec::{timestamp, ItemListCodec};
use crate::config::{ATTR_CUSTOMER_ID, ATTR_PURCHASE_DATE, ATTR_SALES_TOTAL};
use crate::model::{PurchasedItem, Receipt, ReceiptCursor, ReceiptPage};
use crate::table::{attr, AttributeValue, ScanRequest, SledTable, Table};

use super::error::{ReceiptError, ReceiptResult};
use super::record;

/// Data access for receipt records.
///
/// Holds no mutable state of its own: the table handle is shared and only
/// ever receives requests. Cloning is as cheap as cloning the table handle.
#[derive(Clone)]
pub struct ReceiptStore<T: Table> {
    table: T,
    clock: Arc<dyn Clock>,
    codec: ItemListCodec,
}

impl<T: Table> ReceiptStore<T> {
    /// A store stamping receipts with wall-clock time.
    pub fn new(table: T) -> Self {
        Self::with_clock(table, Arc::new(SystemClock))
    }

    pub fn with_clock(table: T, clock: Arc<dyn Clock>) -> Self {
        Self {
            table,
            clock,
            codec: ItemListCodec,
        }
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    // -- Create ---------------------------------------------------------------

    /// Record a purchase and return the receipt exactly as persisted.
    ///
    /// The total is the exact decimal sum of item prices, zero for no
    /// items. One put; a failure leaves nothing behind.
    pub fn create_receipt(
        &self,
        customer_id: &str,
        items: Vec<PurchasedItem>,
    ) -> ReceiptResult<Receipt> {
        if customer_id.trim().is_empty() {
            return Err(ReceiptError::InvalidCustomerId);
        }
        if let Some(item) = items.iter().find(|item| item.price.is_sign_negative()) {
            return Err(ReceiptError::NegativePrice {
                name: item.name.clone(),
                price: item.price.to_string(),
            });
        }

        let sales_total = items.iter().try_fold(Decimal::ZERO, |total, item| {
            total
                .checked_add(item.price)
                .ok_or(ReceiptError::TotalOverflow)
        })?;

        let receipt = Receipt {
            customer_id: customer_id.to_string(),
            purchase_date: self.clock.now(),
            sales_total,
            items,
        };

        self.table.put(record::to_item(&receipt, &self.codec)?)?;

        info!(
            customer_id = %receipt.customer_id,
            purchase_date = %receipt.purchase_date,
            sales_total = %receipt.sales_total,
            items = receipt.items.len(),
            "receipt created"
        );
        Ok(receipt)
    }

    // -- Range sum ------------------------------------------------------------

    /// Total sales with `from <= purchase_date <= to`.
    ///
    /// Follows the table's resume keys until the scan is complete and sums
    /// the stored `salesTotal` of every match. Item blobs are not fetched.
    /// An inverted range matches nothing and sums to zero. Bounds beyond
    /// the years 0000-9999 are clamped, so `DateTime::<Utc>::MAX_UTC` works
    /// as an open upper end. Any failed page fails the whole call.
    pub fn get_sales_between_dates(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> ReceiptResult<Decimal> {
        let filter = attr(ATTR_PURCHASE_DATE).between(
            AttributeValue::string(timestamp::to_bound_text(&from)),
            AttributeValue::string(timestamp::to_bound_text(&to)),
        );
        let rendered = filter.render();
        debug!(filter = %rendered, values = ?rendered.values, "starting range sum");

        let request = ScanRequest::new()
            .with_filter(filter)
            .with_projection([ATTR_CUSTOMER_ID, ATTR_PURCHASE_DATE, ATTR_SALES_TOTAL]);

        let (total, matched) = self.table.scan_pages(request).items().try_fold(
            (Decimal::ZERO, 0usize),
            |(total, matched), item| -> ReceiptResult<(Decimal, usize)> {
                let sale = record::stored_total(&item?)?;
                let total = total.checked_add(sale).ok_or(ReceiptError::SumOverflow)?;
                Ok((total, matched + 1))
            },
        )?;

        info!(%from, %to, matched, %total, "range sum complete");
        Ok(total)
    }

    // -- Listing --------------------------------------------------------------

    /// One page of receipts, at most `limit` long.
    ///
    /// Issues exactly one scan request. With a cursor, the page starts
    /// strictly after that receipt in the table's scan order. A page shorter
    /// than `limit` means this request reached the end of what the table
    /// would return in one response; check `last_evaluated_key` to tell
    /// whether anything follows.
    pub fn get_receipts_paginated(
        &self,
        limit: usize,
        exclusive_start_key: Option<&ReceiptCursor>,
    ) -> ReceiptResult<ReceiptPage> {
        if limit == 0 {
            return Err(ReceiptError::InvalidLimit(limit));
        }

        let start = exclusive_start_key.map(record::cursor_to_key).transpose()?;
        let request = ScanRequest::new().with_limit(limit).starting_after(start);

        let page = self
            .table
            .scan_pages(request)
            .next()
            .transpose()?
            .unwrap_or_default();

        let receipts = page
            .items
            .iter()
            .map(|item| record::from_item(item, &self.codec))
            .collect::<ReceiptResult<Vec<_>>>()?;
        let last_evaluated_key = page
            .last_evaluated_key
            .as_ref()
            .map(record::key_to_cursor)
            .transpose()?;

        debug!(
            limit,
            returned = receipts.len(),
            has_more = last_evaluated_key.is_some(),
            "receipt page served"
        );
        Ok(ReceiptPage {
            receipts,
            last_evaluated_key,
        })
    }

    // -- Point lookup ---------------------------------------------------------

    /// The receipt with exactly this primary key, if stored.
    pub fn get_receipt(&self, cursor: &ReceiptCursor) -> ReceiptResult<Option<Receipt>> {
        let key = record::cursor_to_key(cursor)?;
        self.table
            .get(&key)?
            .map(|item| record::from_item(&item, &self.codec))
            .transpose()
    }
}

impl ReceiptStore<SledTable> {
    /// Number of receipts in the backing sled tree.
    pub fn receipt_count(&self) -> usize {
        self.table.len()
    }
}
