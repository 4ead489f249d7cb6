//! Structured error types for gridlayers.
//!
//! Queries and commands never fail (out-of-range lookups return `None`, illegal
//! structural commands are coerced or ignored). These errors surface from the
//! persisted-state parsers and the CLI, where a bad record is reported and
//! skipped rather than aborting the whole load.

/// All errors that can occur while reading or writing layer state.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// A group record did not follow `name=state:collapseable:breakable:members[:statics]`.
    #[error("Malformed group record: {0}")]
    GroupRecord(String),

    /// A keyword position held something other than the expected tokens.
    #[error("Unknown token '{token}', expected {expected}")]
    UnknownToken {
        /// The offending token.
        token: String,
        /// Human readable list of accepted tokens.
        expected: &'static str,
    },

    /// An index list entry was not a non-negative integer.
    #[error("Invalid index: {0}")]
    InvalidIndex(String),

    /// A persisted index order was not a permutation of the current indexes.
    #[error("Invalid index order: {0}")]
    InvalidOrder(String),

    /// A `index:size` pair could not be parsed.
    #[error("Invalid size entry: {0}")]
    InvalidSize(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridError>;
