/*!
 * Error types for the lessonforge application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur when working with generation provider APIs
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

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The provider returned an empty completion
    #[error("Provider returned an empty completion")]
    EmptyCompletion,
}

/// Errors that can occur while rendering lesson notes into documents
#[derive(Error, Debug)]
pub enum RenderError {
    /// Document serialization failed; the caller sees one generic error
    #[error("Failed to generate document: {0}")]
    Serialization(String),

    /// The lesson content was empty after normalization
    #[error("Nothing to render: lesson content is empty")]
    EmptyContent,
}

/// Errors raised by the payment gateway client or the wallet
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Gateway request failed at the HTTP level
    #[error("Gateway request failed: {0}")]
    GatewayUnavailable(String),

    /// Gateway rejected the charge or verification
    #[error("Gateway rejected request ({status_code}): {message}")]
    GatewayRejected {
        /// HTTP status code
        status_code: u16,
        /// Error message from the gateway
        message: String,
    },

    /// Unparseable gateway response
    #[error("Failed to parse gateway response: {0}")]
    ParseError(String),

    /// Wallet balance does not cover the requested debit
    #[error("Insufficient wallet balance: have {balance} pesewas, need {required}")]
    InsufficientBalance {
        /// Current balance in pesewas
        balance: i64,
        /// Required amount in pesewas
        required: i64,
    },

    /// A transaction reference was not found or is not in a usable state
    #[error("Unknown or unusable transaction reference: {0}")]
    UnknownReference(String),
}

/// Errors from the persistence layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// Underlying SQLite failure
    #[error("Database error: {0}")]
    Database(String),

    /// A looked-up row does not exist
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(error: rusqlite::Error) -> Self {
        match error {
            rusqlite::Error::QueryReturnedNoRows => Self::NotFound("query returned no rows".to_string()),
            other => Self::Database(other.to_string()),
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from document rendering
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Error from the payment gateway or wallet
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    /// Error from persistence
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
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
