//! Scan requests, scan pages, and the page iterator that chains them.
//!
//! A single [`ScanRequest`] yields one [`ScanPage`]. When the page carries a
//! `last_evaluated_key`, the table stopped early and more items may follow;
//! sending the same request again with that key as `exclusive_start_key`
//! picks up where it left off. [`ScanPager`] does that chaining lazily, one
//! request per `next()`, so callers choose between draining the whole scan
//! and taking a single page.

use std::iter::FusedIterator;

use tracing::debug;

use super::attribute::{Item, Key};
use super::error::TableResult;
use super::filter::Condition;
use super::Table;

// ---------------------------------------------------------------------------
// ScanRequest
// ---------------------------------------------------------------------------

/// Parameters of one scan request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanRequest {
    /// Evaluated per item after it is read; non-matching items are skipped
    /// but still count against `limit`.
    pub filter: Option<Condition>,

    /// Attributes to return. `None` returns whole items.
    pub projection: Option<Vec<String>>,

    /// Maximum number of items to evaluate in this request.
    pub limit: Option<usize>,

    /// Resume strictly after this key.
    pub exclusive_start_key: Option<Key>,
}

impl ScanRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: Condition) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_projection<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = Some(attributes.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn starting_after(mut self, key: Option<Key>) -> Self {
        self.exclusive_start_key = key;
        self
    }
}

// ---------------------------------------------------------------------------
// ScanPage
// ---------------------------------------------------------------------------

/// The result of one scan request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    /// Items that passed the filter, projected.
    pub items: Vec<Item>,

    /// Key of the last item evaluated, present only when more items may
    /// follow this page.
    pub last_evaluated_key: Option<Key>,

    /// Number of items evaluated, matched or not.
    pub scanned_count: usize,
}

impl ScanPage {
    pub fn has_more(&self) -> bool {
        self.last_evaluated_key.is_some()
    }
}

// ---------------------------------------------------------------------------
// ScanPager
// ---------------------------------------------------------------------------

/// Lazy, forward-only sequence of scan pages.
///
/// Each call to `next()` issues exactly one request. The pager stops after
/// the first page without a `last_evaluated_key`, or after the first error;
/// it cannot be rewound.
pub struct ScanPager<'t, T: Table + ?Sized> {
    table: &'t T,
    request: ScanRequest,
    pages: usize,
    finished: bool,
}

impl<'t, T: Table + ?Sized> ScanPager<'t, T> {
    pub fn new(table: &'t T, request: ScanRequest) -> Self {
        Self {
            table,
            request,
            pages: 0,
            finished: false,
        }
    }

    /// Number of requests issued so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages
    }

    /// Flatten into a stream of items, still fetched one page at a time.
    pub fn items(self) -> impl Iterator<Item = TableResult<Item>> + 't
    where
        T: 't,
    {
        self.flat_map(|page| -> Box<dyn Iterator<Item = TableResult<Item>>> {
            match page {
                Ok(page) => Box::new(page.items.into_iter().map(Ok)),
                Err(e) => Box::new(std::iter::once(Err(e))),
            }
        })
    }
}

impl<T: Table + ?Sized> Iterator for ScanPager<'_, T> {
    type Item = TableResult<ScanPage>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let result = self.table.scan(&self.request);
        self.pages += 1;

        match &result {
            Ok(page) => {
                debug!(
                    page = self.pages,
                    scanned = page.scanned_count,
                    matched = page.items.len(),
                    has_more = page.has_more(),
                    "scan page fetched"
                );
                match &page.last_evaluated_key {
                    Some(key) => self.request.exclusive_start_key = Some(key.clone()),
                    None => self.finished = true,
                }
            }
            Err(_) => self.finished = true,
        }

        Some(result)
    }
}

impl<T: Table + ?Sized> FusedIterator for ScanPager<'_, T> {}
