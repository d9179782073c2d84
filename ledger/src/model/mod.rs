//! Domain records: purchased items, receipts, and listing pages.

pub mod item;
pub mod receipt;

pub use item::PurchasedItem;
pub use receipt::{Receipt, ReceiptCursor, ReceiptPage};
