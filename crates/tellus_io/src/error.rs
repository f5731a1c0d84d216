//! Error types for the persistence layer.

use thiserror::Error;

/// Main error type for I/O operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// File system errors
    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Saved state that refuses to hydrate
    #[error("Corrupt state: {0}")]
    CorruptState(String),

    /// Not found errors
    #[error("Resource not found: {0}")]
    NotFound(String),
}

/// Result type alias for I/O operations.
pub type Result<T> = std::result::Result<T, IoError>;
