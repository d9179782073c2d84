//! A single purchased line on a receipt.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One purchased item: a named product at a price, with free-form
/// descriptors (flavors, toppings) that the ledger never interprets.
///
/// Prices are exact decimals. The scale is preserved through storage, so an
/// item priced `2.50` reads back as `2.50`, not `2.5`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasedItem {
    /// Display name of the product.
    pub name: String,
    /// Unit price. Must be non-negative for the item to be receipted.
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flavors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub toppings: Vec<String>,
}

impl PurchasedItem {
    /// An item with no descriptors.
    pub fn new(name: impl Into<String>, price: Decimal) -> Self {
        Self {
            name: name.into(),
            price,
            flavors: Vec::new(),
            toppings: Vec::new(),
        }
    }

    pub fn with_flavor(mut self, flavor: impl Into<String>) -> Self {
        self.flavors.push(flavor.into());
        self
    }

    pub fn with_topping(mut self, topping: impl Into<String>) -> Self {
        self.toppings.push(topping.into());
        self
    }
}
