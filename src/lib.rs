//! revharvest - dated review extraction from software review platforms
//!
//! Collects reviews for one company from G2, Capterra and TrustRadius,
//! restricted to an inclusive date window, and normalizes them into a single
//! record shape.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`surface`] - Rendering surface abstraction (scripted replay, headless Chrome)
//! - [`adapter`] - Per-platform URLs, selectors and pagination modes
//! - [`engine`] - Run state machine and the extract/advance loop
//! - [`parser`] - Date parsing, text sanitizing and record normalization
//! - [`models`] - Core data structures and types
//! - [`storage`] - JSON output of result sets
//! - [`utils`] - Common utilities, error types and retry helpers
//!
//! # Example
//!
//! ```no_run
//! use revharvest::config::Config;
//! use revharvest::engine::{ExtractionEngine, RunRequest};
//! use revharvest::models::{DateWindow, Source};
//! use revharvest::surface::ScriptedSurface;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let engine = ExtractionEngine::new(config.scraper);
//!     let window = DateWindow::parse("2024-01-01", "2024-01-31")?;
//!     let request = RunRequest::new("acme-crm", window, Source::TrustRadius);
//!
//!     let surface = ScriptedSurface::appending(["<article class=\"review\">...</article>"]);
//!     let results = engine.run(surface, &request).await?;
//!     println!("{} reviews", results.len());
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod parser;
pub mod storage;
pub mod surface;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::adapter::{adapter_for, SiteAdapter};
    pub use crate::config::Config;
    pub use crate::engine::{ExtractionEngine, RunRequest};
    pub use crate::error::{Error, ErrorCategory, ErrorTrait, Result};
    pub use crate::models::{DateWindow, Rating, ResultSet, ReviewRecord, Source, StopReason};
    pub use crate::storage::ReviewWriter;
    pub use crate::surface::{RenderSurface, ScriptedSurface};
}

// Direct re-exports for convenience
pub use models::{DateWindow, ResultSet, ReviewRecord, Source};
