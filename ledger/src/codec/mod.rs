//! # Attribute Codecs
//!
//! Conversions between domain values and the text the table stores:
//!
//! ```text
//! items.rs      — purchased-item list <-> one JSON text attribute
//! timestamp.rs  — DateTime<Utc> <-> lexically sortable text
//! error.rs      — SerializationError, TimestampError
//! ```

pub mod error;
pub mod items;
pub mod timestamp;

pub use error::{SerializationError, TimestampError};
pub use items::ItemListCodec;
