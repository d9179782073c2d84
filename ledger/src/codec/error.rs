//! Error types for the attribute codecs.

use thiserror::Error;

/// An item list could not be encoded to, or decoded from, its stored text.
///
/// The display text is the underlying encoder's message, unchanged.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct SerializationError {
    message: String,
    #[source]
    source: serde_json::Error,
}

impl SerializationError {
    /// The encoder's own failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<serde_json::Error> for SerializationError {
    fn from(source: serde_json::Error) -> Self {
        Self {
            message: source.to_string(),
            source,
        }
    }
}

/// A timestamp could not be converted to or from its stored text.
#[derive(Debug, Error)]
pub enum TimestampError {
    /// Only years 0000 through 9999 have a fixed-width text form; outside
    /// that range lexical order would stop matching time order.
    #[error("year {0} is outside the sortable range 0000-9999")]
    OutOfRange(i32),

    /// The stored text is not an RFC 3339 timestamp.
    #[error("invalid timestamp text {text:?}: {source}")]
    Parse {
        text: String,
        #[source]
        source: chrono::ParseError,
    },
}
