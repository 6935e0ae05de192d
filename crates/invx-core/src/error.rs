//! Error types for the invx-core library.
//!
//! Extraction itself never fails; these cover the edges of the engine
//! (reading inputs, decoding analysis responses, configuration).

use thiserror::Error;

/// Main error type for the invx library.
#[derive(Error, Debug)]
pub enum InvxError {
    /// I/O error while reading a source document or config file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON (analysis response or configuration).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A configured pattern could not be compiled.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for the invx library.
pub type Result<T> = std::result::Result<T, InvxError>;
