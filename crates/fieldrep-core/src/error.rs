//! Error types for fieldrep-core

use thiserror::Error;

/// Result type alias using fieldrep-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in fieldrep-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Local persistence failed (disk full, corruption, constraint violation).
    ///
    /// Never dropped: a pending mutation that fails here exists nowhere else.
    #[error("Local storage error: {0}")]
    LocalStorage(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The remote authority refused or could not serve an on-demand request
    #[error("Remote error: {0}")]
    Remote(#[from] crate::sync::GatewayError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
