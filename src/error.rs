//! Unified error handling for the trendcast crate
//!
//! Each module defines its own `thiserror` enum for the failures it can
//! actually produce; this module consolidates them into a single [`Error`]
//! so callers can cross module boundaries with `?` without losing detail.

use std::io;
use thiserror::Error;

// Re-export domain-specific errors for convenience
pub use crate::picker::PickerError;
pub use crate::publisher::PublishError;
pub use crate::source::SourceError;
pub use crate::storage::StoreError;

/// Unified error type for the trendcast crate
#[derive(Error, Debug)]
pub enum Error {
    /// Trending-list or metadata fetch errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Announcement store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Publication channel errors
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check if this error is transient and worth another cycle
    ///
    /// Nothing in the pipeline is process-fatal; this classification only
    /// decides how loudly the failure is logged.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Source(_) => true,
            Self::Store(e) => e.is_recoverable(),
            Self::Publish(e) => e.is_recoverable(),
            Self::Config(_) => false,
            Self::Io(_) => true,
            Self::Json(_) => false,
        }
    }
}

// Conversion from anyhow::Error at the binary boundary
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_errors_are_recoverable() {
        let err = Error::Source(SourceError::ServerError(503));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_config_errors_are_not_recoverable() {
        let err = Error::config("missing webhook URL");
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("missing webhook URL"));
    }

    #[test]
    fn test_error_conversion() {
        let store_err = StoreError::Pool("pool timed out".to_string());
        let unified: Error = store_err.into();
        assert!(matches!(unified, Error::Store(_)));
    }
}
