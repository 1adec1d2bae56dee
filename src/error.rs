//! Unified error handling for the revharvest crate
//!
//! This module provides a unified error type that consolidates the
//! domain-specific errors into a single `Error` enum, while keeping the
//! domain errors usable on their own.
//!
//! # Architecture
//!
//! - [`ErrorTrait`] - Common interface implemented by the unified error
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! # Usage
//!
//! ```rust,ignore
//! use revharvest::error::{Error, ErrorTrait};
//!
//! fn handle_error(err: Error) {
//!     if err.is_recoverable() {
//!         println!("Retry later: {}", err.describe());
//!     } else {
//!         eprintln!("Fatal error: {}", err);
//!     }
//! }
//! ```

use std::io;
use thiserror::Error;

pub use crate::utils::error::{RenderError, ScrapeError};

/// Common trait for revharvest error types
pub trait ErrorTrait: std::error::Error {
    /// Check if this error is recoverable (a later attempt may succeed)
    fn is_recoverable(&self) -> bool;

    /// Short user-facing description
    fn describe(&self) -> String;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Caller supplied a bad slug, window or source
    Input,
    /// Navigation and rendering failures
    Browser,
    /// Output and I/O errors
    Storage,
    /// Serialization errors
    Serialization,
    /// Configuration and validation errors
    Config,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Get a human-readable label for the category
    pub fn label(&self) -> &'static str {
        match self {
            Self::Input => "input error",
            Self::Browser => "browser error",
            Self::Storage => "storage error",
            Self::Serialization => "serialization error",
            Self::Config => "configuration error",
            Self::Other => "other error",
        }
    }
}

/// Unified error type for the revharvest crate
#[derive(Error, Debug)]
pub enum Error {
    /// Fatal run errors
    #[error("Scrape error: {0}")]
    Scrape(#[from] ScrapeError),

    /// Rendering surface errors outside a run (e.g. launching the browser)
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Scrape(e) => e.is_recoverable(),
            Self::Render(e) => e.is_recoverable(),
            Self::Io(_) => true, // I/O errors are often transient
            Self::Json(_) => false,
            Self::Config(_) => false,
            Self::Other { .. } => false,
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Scrape(ScrapeError::InvalidInput(msg)) => format!("invalid input: {msg}"),
            Self::Scrape(ScrapeError::NavigationFailed { url, attempts, .. }) => {
                format!("could not open {url} after {attempts} attempts")
            }
            Self::Scrape(ScrapeError::Render(e)) | Self::Render(e) => {
                format!("{}: {e}", self.category().label())
            }
            Self::Io(e) => format!("{}: {e}", self.category().label()),
            Self::Json(e) => format!("{}: {e}", self.category().label()),
            Self::Config(msg) => format!("{}: {msg}", self.category().label()),
            Self::Other { context, .. } => context.clone(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Scrape(ScrapeError::InvalidInput(_)) => ErrorCategory::Input,
            Self::Scrape(_) | Self::Render(_) => ErrorCategory::Browser,
            Self::Io(_) => ErrorCategory::Storage,
            Self::Json(_) => ErrorCategory::Serialization,
            Self::Config(_) => ErrorCategory::Config,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Create a generic error with context and source
    pub fn with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Other {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Conversion from anyhow::Error
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other {
            context: err.to_string(),
            source: None,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category() {
        let err = Error::Scrape(ScrapeError::invalid_input("empty slug"));
        assert_eq!(err.category(), ErrorCategory::Input);

        let err = Error::Render(RenderError::Closed);
        assert_eq!(err.category(), ErrorCategory::Browser);
    }

    #[test]
    fn test_is_recoverable() {
        let err: Error = ScrapeError::NavigationFailed {
            url: "https://example.com".into(),
            attempts: 3,
            source: RenderError::Navigation("reset".into()),
        }
        .into();
        assert!(err.is_recoverable());

        let err: Error = ScrapeError::invalid_input("start after end").into();
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_describe_navigation_failure() {
        let err: Error = ScrapeError::NavigationFailed {
            url: "https://www.trustradius.com/products/acme/reviews".into(),
            attempts: 4,
            source: RenderError::timeout("load", 30_000),
        }
        .into();
        assert_eq!(
            err.describe(),
            "could not open https://www.trustradius.com/products/acme/reviews after 4 attempts"
        );
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("max_steps must be greater than 0");
        assert_eq!(err.category(), ErrorCategory::Config);
        assert!(!err.is_recoverable());
        assert!(err.describe().starts_with("configuration error"));
    }

    #[test]
    fn test_other_error() {
        let err = Error::other("Something went wrong");
        assert_eq!(err.category(), ErrorCategory::Other);
        assert_eq!(err.describe(), "Something went wrong");
    }
}
