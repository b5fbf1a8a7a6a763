/*!
 * Error types for the excerpt-align application.
 *
 * Data-quality findings (missing translations, misattributed quotes, ...)
 * are not errors: they are returned as `ValidationStatus` values. The types
 * below cover the conditions that break a collaborator contract and should
 * abort a batch outright.
 */

use thiserror::Error;

/// Errors raised by a document store implementation
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store cannot be reached or opened
    #[error("Document store unavailable: {0}")]
    Unavailable(String),

    /// The store returned data that violates its own format
    #[error("Document store is corrupt: {0}")]
    Corrupt(String),

    /// A query against the store failed
    #[error("Document store query failed: {0}")]
    Query(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(error: rusqlite::Error) -> Self {
        match error {
            // A stored row that no longer reads back as its declared type
            rusqlite::Error::InvalidColumnType(..)
            | rusqlite::Error::IntegralValueOutOfRange(..)
            | rusqlite::Error::FromSqlConversionFailure(..) => Self::Corrupt(error.to_string()),
            other => Self::Query(other.to_string()),
        }
    }
}

/// Errors parsing a unit reference string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    /// The reference does not follow `[collection:]sequence.subsequence`
    #[error("Malformed unit reference: '{0}'")]
    Malformed(String),

    /// A component is outside its valid range
    #[error("Unit reference out of range: '{0}'")]
    OutOfRange(String),
}

/// Errors that can occur when working with translation generator APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the document store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Error from the translation generator
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::File(format!("invalid JSON: {}", error))
    }
}
