//! Attribute values and the item map they live in.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A stored item: attribute name -> value.
pub type Item = BTreeMap<String, AttributeValue>;

/// The primary-key attributes of an item, on their own. Used as the
/// exclusive start of a scan and as the resume point a page hands back.
pub type Key = BTreeMap<String, AttributeValue>;

/// A single attribute value.
///
/// Numbers travel as decimal text so no precision is lost between the
/// writer and the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeValue {
    /// String.
    S(String),
    /// Number, as decimal text.
    N(String),
}

impl AttributeValue {
    pub fn string(value: impl Into<String>) -> Self {
        AttributeValue::S(value.into())
    }

    pub fn number(value: Decimal) -> Self {
        AttributeValue::N(value.to_string())
    }

    pub fn as_s(&self) -> Option<&str> {
        match self {
            AttributeValue::S(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_n(&self) -> Option<&str> {
        match self {
            AttributeValue::N(n) => Some(n),
            _ => None,
        }
    }

    /// Parse a number attribute. `None` for non-numbers and unparsable text.
    pub fn as_decimal(&self) -> Option<Decimal> {
        self.as_n().and_then(|n| Decimal::from_str(n).ok())
    }

    /// Order two values of the same type. Strings compare bytewise,
    /// numbers numerically. Mixed types are unordered.
    pub fn compare(&self, other: &AttributeValue) -> Option<Ordering> {
        match (self, other) {
            (AttributeValue::S(a), AttributeValue::S(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
            (AttributeValue::N(_), AttributeValue::N(_)) => {
                Some(self.as_decimal()?.cmp(&other.as_decimal()?))
            }
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::S(s) => write!(f, "{s:?}"),
            AttributeValue::N(n) => write!(f, "{n}"),
        }
    }
}
