//! Unified error handling for the zenclass crate
//!
//! Every failure the library can produce is an [`Error`]. Each variant belongs
//! to an [`ErrorCategory`], which the HTTP layer uses to choose a status code.
//!
//! # Usage
//!
//! ```rust,ignore
//! use zenclass::error::{Error, ErrorCategory};
//!
//! fn status_for(err: &Error) -> u16 {
//!     match err.category() {
//!         ErrorCategory::Input => 400,
//!         ErrorCategory::NotFound => 404,
//!         _ => 500,
//!     }
//! }
//! ```

use thiserror::Error;

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Malformed caller input (identifiers, dates)
    Input,
    /// A well-formed reference with no matching record
    NotFound,
    /// Record store connectivity and query errors
    Storage,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::NotFound => "not_found",
            Self::Storage => "storage",
        }
    }
}

/// Unified error type for the zenclass crate
#[derive(Error, Debug)]
pub enum Error {
    /// Caller supplied something unusable
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// MongoDB driver errors
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    /// Stored document could not be decoded
    #[error("Document decode error: {0}")]
    Decode(#[from] bson::de::Error),

    /// Store-level failure that is not a driver error
    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Create an invalid-input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a not-found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Get the error category for handling strategies
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput(_) => ErrorCategory::Input,
            Self::NotFound(_) => ErrorCategory::NotFound,
            Self::Database(_) | Self::Decode(_) | Self::Storage(_) => ErrorCategory::Storage,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
