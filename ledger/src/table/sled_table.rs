//! # SledTable — Embedded Table Backend
//!
//! A [`Table`] on top of one sled tree. Keys are encoded by the table's
//! [`KeySchema`]; values are `bincode(Item)`.
//!
//! | Tree               | Key                          | Value          |
//! |--------------------|------------------------------|----------------|
//! | `config.table_name`| `partition 0x00 sort` (UTF-8)| `bincode(Item)`|
//!
//! sled iterates in byte order, so a scan walks the table partition by
//! partition, and within a partition by sort key. That order is the only
//! one a scan promises; it is not chronological across customers.
//!
//! ## Page Cap
//!
//! Each scan request evaluates at most `max_page_items` items no matter how
//! large the caller's limit is. Hosted stores cap responses by size; this is
//! the same behaviour expressed as a count, and it is what makes callers
//! follow `last_evaluated_key`.

use sled::{Db, Tree};
use std::ops::Bound;
use std::path::Path;

use super::attribute::{Item, Key};
use super::error::{TableError, TableResult};
use super::key::KeySchema;
use super::scan::{ScanPage, ScanRequest};
use super::Table;
use crate::config::LedgerConfig;

// ---------------------------------------------------------------------------
// SledTable
// ---------------------------------------------------------------------------

/// A scan-capable table stored in a sled tree.
///
/// # Thread Safety
///
/// sled trees support lock-free concurrent reads and serialized writes.
/// `SledTable` is `Clone` (handles are reference counted) and can be shared
/// across threads without external synchronization.
#[derive(Debug, Clone)]
pub struct SledTable {
    /// The underlying sled database handle.
    db: Db,
    /// The tree holding this table's items.
    tree: Tree,
    key_schema: KeySchema,
    max_page_items: usize,
    flush_on_write: bool,
}

impl SledTable {
    /// Open or create a table in the database at `path`.
    pub fn open<P: AsRef<Path>>(
        path: P,
        key_schema: KeySchema,
        config: &LedgerConfig,
    ) -> TableResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db, key_schema, config)
    }

    /// A table in a temporary database that is removed on drop.
    ///
    /// No filesystem cleanup needed; meant for tests.
    pub fn open_temporary(key_schema: KeySchema, config: &LedgerConfig) -> TableResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db, key_schema, config)
    }

    /// Open the configured tree inside an already-open database.
    pub fn from_db(db: Db, key_schema: KeySchema, config: &LedgerConfig) -> TableResult<Self> {
        if config.max_page_items == 0 {
            return Err(TableError::Validation(
                "max_page_items must be at least 1".to_string(),
            ));
        }
        let tree = db.open_tree(&config.table_name)?;
        Ok(Self {
            db,
            tree,
            key_schema,
            max_page_items: config.max_page_items,
            flush_on_write: config.flush_on_write,
        })
    }

    /// Number of items stored.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Block until all pending writes are durable.
    pub fn flush(&self) -> TableResult<()> {
        self.db.flush()?;
        Ok(())
    }

    fn decode(bytes: &[u8]) -> TableResult<Item> {
        bincode::deserialize(bytes).map_err(|e| TableError::Encoding(e.to_string()))
    }
}

fn project(item: Item, projection: Option<&[String]>) -> Item {
    match projection {
        None => item,
        Some(attributes) => item
            .into_iter()
            .filter(|(name, _)| attributes.iter().any(|wanted| wanted == name))
            .collect(),
    }
}

impl Table for SledTable {
    fn key_schema(&self) -> &KeySchema {
        &self.key_schema
    }

    fn put(&self, item: Item) -> TableResult<()> {
        let key = self.key_schema.key_of(&item)?;
        let key_bytes = self.key_schema.encode(&key)?;
        let value = bincode::serialize(&item).map_err(|e| TableError::Encoding(e.to_string()))?;

        self.tree.insert(key_bytes, value)?;
        if self.flush_on_write {
            self.db.flush()?;
        }
        Ok(())
    }

    fn get(&self, key: &Key) -> TableResult<Option<Item>> {
        let key_bytes = self.key_schema.encode(key)?;
        match self.tree.get(key_bytes)? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan(&self, request: &ScanRequest) -> TableResult<ScanPage> {
        let budget = match request.limit {
            Some(0) => {
                return Err(TableError::Validation(
                    "scan limit must be at least 1".to_string(),
                ))
            }
            Some(limit) => limit.min(self.max_page_items),
            None => self.max_page_items,
        };

        let mut entries = match &request.exclusive_start_key {
            Some(start) => {
                let start = self.key_schema.encode(start)?;
                self.tree
                    .range::<Vec<u8>, _>((Bound::Excluded(start), Bound::Unbounded))
            }
            None => self.tree.iter(),
        };

        let mut page = ScanPage::default();
        let mut last_key = None;

        while page.scanned_count < budget {
            let Some(entry) = entries.next() else {
                // Table exhausted inside the budget.
                return Ok(page);
            };
            let (_, bytes) = entry?;
            let item = Self::decode(&bytes)?;
            page.scanned_count += 1;
            last_key = Some(self.key_schema.key_of(&item)?);

            let keep = request
                .filter
                .as_ref()
                .map_or(true, |filter| filter.matches(&item));
            if keep {
                page.items.push(project(item, request.projection.as_deref()));
            }
        }

        // Budget spent. Hand back a resume point only if something follows.
        if entries.next().transpose()?.is_some() {
            page.last_evaluated_key = last_key;
        }
        Ok(page)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
