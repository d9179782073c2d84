//! Error type for receipt operations.

use thiserror::Error;

use crate::codec::{SerializationError, TimestampError};
use crate::table::TableError;

/// Errors surfaced by [`super::ReceiptStore`].
///
/// Table failures pass through unchanged; nothing here retries.
#[derive(Debug, Error)]
pub enum ReceiptError {
    #[error(transparent)]
    Table(#[from] TableError),

    /// The item list could not be encoded or decoded.
    #[error("item list serialization failed: {0}")]
    Serialization(#[from] SerializationError),

    #[error("timestamp conversion failed: {0}")]
    Timestamp(#[from] TimestampError),

    #[error("customer id must not be empty")]
    InvalidCustomerId,

    #[error("page limit must be at least 1, got {0}")]
    InvalidLimit(usize),

    #[error("item {name:?} has negative price {price}")]
    NegativePrice { name: String, price: String },

    /// The prices of one purchase sum past the representable decimal range.
    #[error("sales total overflowed")]
    TotalOverflow,

    /// Stored totals in a range sum past the representable decimal range.
    #[error("sales sum over stored receipts overflowed")]
    SumOverflow,

    /// A stored record is missing an attribute or holds the wrong type.
    #[error("malformed receipt record: {0}")]
    MalformedRecord(String),
}

impl ReceiptError {
    /// Whether the caller's input was rejected, as opposed to the store or
    /// its stored records failing.
    ///
    /// A timestamp outside 0000-9999 can only come from a caller's cursor or
    /// purchase; a timestamp that fails to parse was read back from a record.
    /// Table validation failures come from malformed cursor keys.
    pub fn is_caller_error(&self) -> bool {
        match self {
            ReceiptError::InvalidCustomerId
            | ReceiptError::InvalidLimit(_)
            | ReceiptError::NegativePrice { .. }
            | ReceiptError::TotalOverflow
            | ReceiptError::Timestamp(TimestampError::OutOfRange(_))
            | ReceiptError::Table(TableError::Validation(_)) => true,
            ReceiptError::Table(_)
            | ReceiptError::Serialization(_)
            | ReceiptError::Timestamp(TimestampError::Parse { .. })
            | ReceiptError::SumOverflow
            | ReceiptError::MalformedRecord(_) => false,
        }
    }
}

pub type ReceiptResult<T> = Result<T, ReceiptError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_are_the_callers() {
        assert!(ReceiptError::InvalidCustomerId.is_caller_error());
        assert!(ReceiptError::InvalidLimit(0).is_caller_error());
        assert!(ReceiptError::TotalOverflow.is_caller_error());
        assert!(ReceiptError::Timestamp(TimestampError::OutOfRange(10_000)).is_caller_error());
    }

    #[test]
    fn stored_data_errors_are_not_the_callers() {
        assert!(!ReceiptError::SumOverflow.is_caller_error());
        assert!(!ReceiptError::MalformedRecord("salesTotal".into()).is_caller_error());

        let parse = crate::codec::timestamp::from_text("garbage").unwrap_err();
        assert!(!ReceiptError::Timestamp(parse).is_caller_error());

        let encoding = TableError::Encoding("truncated value".into());
        assert!(!ReceiptError::Table(encoding).is_caller_error());
    }

    #[test]
    fn malformed_cursor_keys_are_the_callers() {
        let validation = TableError::Validation("key attribute customerId is empty".into());
        assert!(ReceiptError::Table(validation).is_caller_error());
    }
}
