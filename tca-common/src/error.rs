//! Common error types for the authoring tool

use thiserror::Error;

use crate::csv::CsvError;

/// Common result type for authoring operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the authoring crates
#[derive(Error, Debug)]
pub enum Error {
    /// CSV pipeline failure; the message is meant to be shown verbatim
    #[error(transparent)]
    Csv(#[from] CsvError),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode error for persisted collections
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// No suite with the given id
    #[error("Suite not found: {0}")]
    SuiteNotFound(String),

    /// No test with the given id
    #[error("Test not found: {0}")]
    TestNotFound(String),

    /// Backing key-value store could not be read or written
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// True for the "no such record" family of errors
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::SuiteNotFound(_) | Error::TestNotFound(_))
    }
}
