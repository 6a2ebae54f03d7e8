//! Sheet error types

use thiserror::Error;

/// Errors surfaced to the host
///
/// Everything else (bad sizes, gesture conflicts) is recovered internally.
#[derive(Error, Debug)]
pub enum SheetError {
    /// A sheet was built without content to host
    #[error("Sheet requires content before it can be presented")]
    MissingContent,

    /// Configuration could not be parsed
    #[error("Invalid sheet configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read
    #[error("Failed to read sheet configuration: {0}")]
    ConfigIo(#[from] std::io::Error),
}

/// Result type for sheet operations
pub type Result<T> = std::result::Result<T, SheetError>;
