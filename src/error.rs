//! Error types for feedling.

use thiserror::Error;

/// Common error type for feedling.
#[derive(Error, Debug)]
pub enum FeedlingError {
    /// A feed could not be fetched or parsed.
    ///
    /// Per-source and non-fatal: the aggregator records it and moves on.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// A single item field could not be parsed (e.g. a malformed date).
    #[error("parse error: {0}")]
    Parse(String),

    /// The remote translation service call failed.
    #[error("remote service error: {0}")]
    RemoteService(String),

    /// Cache storage could not be read or written.
    #[error("cache I/O error: {0}")]
    CacheIo(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for feedling operations.
pub type Result<T> = std::result::Result<T, FeedlingError>;
