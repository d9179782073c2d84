//! Receipt <-> table item mapping.
//!
//! | Attribute      | Type | Content                                  |
//! |----------------|------|------------------------------------------|
//! | `customerId`   | S    | partition key                            |
//! | `purchaseDate` | S    | sort key, canonical timestamp text       |
//! | `salesTotal`   | N    | decimal sum of item prices               |
//! | `items`        | S    | [`ItemListCodec`] blob                   |

use rust_decimal::Decimal;

use crate::codec::{timestamp, ItemListCodec};
use crate::config::{ATTR_CUSTOMER_ID, ATTR_ITEMS, ATTR_PURCHASE_DATE, ATTR_SALES_TOTAL};
use crate::model::{Receipt, ReceiptCursor};
use crate::table::{AttributeValue, Item, Key, KeySchema};

use super::error::{ReceiptError, ReceiptResult};

/// Primary-key layout of the receipt table.
pub fn receipt_key_schema() -> KeySchema {
    KeySchema::composite(ATTR_CUSTOMER_ID, ATTR_PURCHASE_DATE)
}

/// Table key for a cursor. The date goes through the same converter as the
/// stored attribute, so the key matches byte for byte.
pub fn cursor_to_key(cursor: &ReceiptCursor) -> ReceiptResult<Key> {
    let mut key = Key::new();
    key.insert(
        ATTR_CUSTOMER_ID.to_string(),
        AttributeValue::string(cursor.customer_id.as_str()),
    );
    key.insert(
        ATTR_PURCHASE_DATE.to_string(),
        AttributeValue::string(timestamp::to_text(&cursor.purchase_date)?),
    );
    Ok(key)
}

pub fn key_to_cursor(key: &Key) -> ReceiptResult<ReceiptCursor> {
    Ok(ReceiptCursor {
        customer_id: string_attr(key, ATTR_CUSTOMER_ID)?.to_string(),
        purchase_date: timestamp::from_text(string_attr(key, ATTR_PURCHASE_DATE)?)?,
    })
}

pub fn to_item(receipt: &Receipt, codec: &ItemListCodec) -> ReceiptResult<Item> {
    let mut item = cursor_to_key(&receipt.cursor())?;
    item.insert(
        ATTR_SALES_TOTAL.to_string(),
        AttributeValue::number(receipt.sales_total),
    );
    item.insert(
        ATTR_ITEMS.to_string(),
        AttributeValue::string(codec.encode(Some(&receipt.items))?),
    );
    Ok(item)
}

/// Rebuild a full receipt, decoding the item blob. A record without an
/// `items` attribute reads as a receipt with no items.
pub fn from_item(item: &Item, codec: &ItemListCodec) -> ReceiptResult<Receipt> {
    let cursor = key_to_cursor(item)?;
    let blob = match item.get(ATTR_ITEMS) {
        Some(value) => Some(value.as_s().ok_or_else(|| {
            ReceiptError::MalformedRecord(format!("{ATTR_ITEMS} is not a string"))
        })?),
        None => None,
    };

    Ok(Receipt {
        customer_id: cursor.customer_id,
        purchase_date: cursor.purchase_date,
        sales_total: stored_total(item)?,
        items: codec.decode(blob)?,
    })
}

/// The stored `salesTotal` of a record. Never touches the item blob.
pub fn stored_total(item: &Item) -> ReceiptResult<Decimal> {
    item.get(ATTR_SALES_TOTAL)
        .ok_or_else(|| ReceiptError::MalformedRecord(format!("missing {ATTR_SALES_TOTAL}")))?
        .as_decimal()
        .ok_or_else(|| ReceiptError::MalformedRecord(format!("{ATTR_SALES_TOTAL} is not a number")))
}

fn string_attr<'a>(item: &'a Item, name: &str) -> ReceiptResult<&'a str> {
    item.get(name)
        .and_then(AttributeValue::as_s)
        .ok_or_else(|| ReceiptError::MalformedRecord(format!("missing string attribute {name}")))
}
