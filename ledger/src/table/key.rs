//! Primary-key schema and the byte encoding of keys.
//!
//! A key is a partition attribute followed by a sort attribute. Both must be non-empty strings without NUL bytes. On disk the
//! key is `partition 0x00 sort`, so sled's byte order walks all of one
//! partition (sorted by the sort attribute) before the next partition.

use super::attribute::{AttributeValue, Item, Key};
use super::error::{TableError, TableResult};

/// Separator between the partition and sort components of an encoded key.
const KEY_SEPARATOR: u8 = 0x00;

/// Names of the attributes that make up a table's primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySchema {
    partition_key: String,
    sort_key: String,
}

impl KeySchema {
    /// A partition attribute plus a sort attribute.
    pub fn composite(partition_key: impl Into<String>, sort_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key: sort_key.into(),
        }
    }

    /// Attribute names in key order.
    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        [self.partition_key.as_str(), self.sort_key.as_str()].into_iter()
    }

    /// Copy the key attributes out of `item`.
    pub fn key_of(&self, item: &Item) -> TableResult<Key> {
        let mut key = Key::new();
        for name in self.attributes() {
            let value = item
                .get(name)
                .ok_or_else(|| TableError::Validation(format!("missing key attribute {name}")))?;
            key.insert(name.to_string(), value.clone());
        }
        Ok(key)
    }

    /// Encode `key` into the bytes sled orders by.
    pub fn encode(&self, key: &Key) -> TableResult<Vec<u8>> {
        if key.len() != self.attributes().count() {
            return Err(TableError::Validation(format!(
                "key has {} attributes, schema expects {}",
                key.len(),
                self.attributes().count()
            )));
        }

        let mut bytes = Vec::new();
        for (i, name) in self.attributes().enumerate() {
            let component = key
                .get(name)
                .ok_or_else(|| TableError::Validation(format!("missing key attribute {name}")))?;
            let text = key_component(name, component)?;
            if i > 0 {
                bytes.push(KEY_SEPARATOR);
            }
            bytes.extend_from_slice(text.as_bytes());
        }
        Ok(bytes)
    }
}

fn key_component<'a>(name: &str, value: &'a AttributeValue) -> TableResult<&'a str> {
    let text = value
        .as_s()
        .ok_or_else(|| TableError::Validation(format!("key attribute {name} must be a string")))?;
    if text.is_empty() {
        return Err(TableError::Validation(format!("key attribute {name} is empty")));
    }
    if text.as_bytes().contains(&KEY_SEPARATOR) {
        return Err(TableError::Validation(format!(
            "key attribute {name} contains a NUL byte"
        )));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> KeySchema {
        KeySchema::composite("customerId", "purchaseDate")
    }

    fn key(customer: &str, date: &str) -> Key {
        let mut key = Key::new();
        key.insert("customerId".into(), AttributeValue::string(customer));
        key.insert("purchaseDate".into(), AttributeValue::string(date));
        key
    }

    #[test]
    fn composite_key_groups_by_partition_then_sort() {
        let s = schema();
        let a1 = s.encode(&key("a", "2026-01-02")).unwrap();
        let a2 = s.encode(&key("a", "2026-01-03")).unwrap();
        let ab = s.encode(&key("ab", "2026-01-01")).unwrap();
        let b1 = s.encode(&key("b", "2026-01-01")).unwrap();

        assert!(a1 < a2);
        assert!(a2 < ab);
        assert!(ab < b1);
    }

    #[test]
    fn key_of_ignores_non_key_attributes() {
        let mut item = key("c-1", "2026-01-01");
        item.insert("salesTotal".into(), AttributeValue::N("3".into()));
        let extracted = schema().key_of(&item).unwrap();
        assert_eq!(extracted, key("c-1", "2026-01-01"));
    }

    #[test]
    fn missing_or_malformed_components_are_rejected() {
        let s = schema();
        let mut partial = Key::new();
        partial.insert("customerId".into(), AttributeValue::string("c"));
        assert!(s.encode(&partial).is_err());
        assert!(s.key_of(&partial).is_err());

        assert!(s.encode(&key("", "2026")).is_err());
        assert!(s.encode(&key("c\0d", "2026")).is_err());

        let mut numeric = key("c", "2026");
        numeric.insert("purchaseDate".into(), AttributeValue::N("1".into()));
        assert!(s.encode(&numeric).is_err());
    }

    #[test]
    fn extra_attributes_in_a_key_are_rejected() {
        let mut k = key("c", "2026");
        k.insert("salesTotal".into(), AttributeValue::N("1".into()));
        assert!(schema().encode(&k).is_err());
    }

    #[test]
    fn attributes_list_partition_then_sort() {
        let binding = schema();
        let names: Vec<&str> = binding.attributes().collect();
        assert_eq!(names, vec!["customerId", "purchaseDate"]);
    }
}
