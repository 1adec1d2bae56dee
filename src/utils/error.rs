//! Error types for the review extraction engine
//!
//! This module defines the error types used by the rendering surface and the
//! extraction run. Non-fatal conditions (unparseable dates, review blocks with
//! missing fields) are not errors; they are counted in
//! [`RunStats`](crate::models::RunStats).

use thiserror::Error;

/// Errors reported by a rendering surface
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A bounded wait ran out
    #[error("Timed out after {timeout_ms}ms waiting for {what}")]
    Timeout { what: String, timeout_ms: u64 },

    /// Page navigation failed (network error, bad response, crashed tab)
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// No element matched the selector
    #[error("No element matches selector: {0}")]
    ElementNotFound(String),

    /// The selector could not be parsed
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// In-page script evaluation failed
    #[error("Script evaluation failed: {0}")]
    Script(String),

    /// The surface was already closed
    #[error("Rendering surface is closed")]
    Closed,

    /// Any other failure reported by the automation backend
    #[error("Browser backend error: {0}")]
    Backend(String),
}

impl RenderError {
    /// Check if retrying the same operation may succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Navigation(_) | Self::Backend(_) => true,
            Self::ElementNotFound(_)
            | Self::InvalidSelector(_)
            | Self::Script(_)
            | Self::Closed => false,
        }
    }

    /// Create a timeout error
    pub fn timeout(what: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            what: what.into(),
            timeout_ms,
        }
    }
}

/// Fatal errors of a single extraction run
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// Bad company slug or date window; no run is attempted
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The listing page could not be loaded within the retry bound
    #[error("Navigation to {url} failed after {attempts} attempts: {source}")]
    NavigationFailed {
        url: String,
        attempts: u32,
        #[source]
        source: RenderError,
    },

    /// The surface failed while paginating or extracting
    #[error("Rendering error: {0}")]
    Render(#[from] RenderError),
}

impl ScrapeError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Check if a fresh run may succeed where this one failed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::InvalidInput(_) => false,
            Self::NavigationFailed { .. } => true,
            Self::Render(e) => e.is_recoverable(),
        }
    }
}
