//! Common error types for Tubescope

use thiserror::Error;

/// Common result type for Tubescope operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Tubescope services
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON encoding or decoding error
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
