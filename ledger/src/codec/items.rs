//! Purchased-item list <-> single text attribute.
//!
//! A receipt's items are stored as one JSON array in one attribute rather
//! than as a nested structure the table would have to understand. The
//! empties are deliberately asymmetric:
//!
//! | Input            | `encode`  | `decode`        |
//! |------------------|-----------|-----------------|
//! | absent (`None`)  | `""`      | empty list      |
//! | empty list       | `"[]"`    | n/a             |
//! | `""` / `"  "`    | n/a       | empty list      |
//!
//! So `decode(encode(x)) == x` holds for every present list, and an absent
//! list comes back as an empty one.

use crate::model::PurchasedItem;

use super::error::SerializationError;

/// Codec for the `items` attribute of a receipt record.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemListCodec;

impl ItemListCodec {
    /// Encode `items` as stored text. `None` encodes as the empty string.
    pub fn encode(&self, items: Option<&[PurchasedItem]>) -> Result<String, SerializationError> {
        match items {
            None => Ok(String::new()),
            Some(items) => Ok(serde_json::to_string(items)?),
        }
    }

    /// Decode stored text. Absent, empty, and whitespace-only text all
    /// decode to an empty list.
    pub fn decode(&self, blob: Option<&str>) -> Result<Vec<PurchasedItem>, SerializationError> {
        match blob {
            Some(text) if !text.trim().is_empty() => Ok(serde_json::from_str(text)?),
            _ => Ok(Vec::new()),
        }
    }
}
