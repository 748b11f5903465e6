//! Error types for payload normalization.

use thiserror::Error;

/// Errors that prevent a payload from becoming a [`super::ProductRecord`].
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The body is not JSON of the expected shape.
    #[error("failed to parse product JSON for {identifier}: {source}")]
    Parse {
        /// Identifier the payload was fetched for.
        identifier: String,
        /// The underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}

impl NormalizeError {
    /// Creates a parse error.
    pub fn parse(identifier: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Parse {
            identifier: identifier.into(),
            source,
        }
    }
}
