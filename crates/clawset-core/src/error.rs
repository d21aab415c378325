//! Error types for clawset.

use thiserror::Error;

/// Core error type for all clawset operations.
#[derive(Error, Debug)]
pub enum ClawsetError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Model fetch failed: {0}")]
    Fetch(String),

    #[error("Operation failed: {name} — {message}")]
    Operation { name: String, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ClawsetError>;
