//! Error type for table operations.

use thiserror::Error;

/// Errors raised by a [`super::Table`] implementation.
///
/// The receipt layer passes these through untouched.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// A stored item could not be encoded or decoded.
    #[error("item encoding error: {0}")]
    Encoding(String),

    /// The request or item is malformed: missing key attributes, a zero
    /// limit, a key that cannot be encoded.
    #[error("validation error: {0}")]
    Validation(String),
}

pub type TableResult<T> = Result<T, TableError>;
