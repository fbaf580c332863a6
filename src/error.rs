//! Error types for the Toolbelt helpers.

use thiserror::Error;

/// Main error type for Toolbelt operations.
#[derive(Error, Debug)]
pub enum ToolbeltError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Key/value store or cookie jar errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// A tokio timer was requested outside of a runtime
    #[error("No tokio runtime available: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Toolbelt operations.
pub type Result<T> = std::result::Result<T, ToolbeltError>;
