//! Rendering surface abstraction
//!
//! The extraction engine never talks to a browser directly. It consumes the
//! small set of primitives in [`RenderSurface`]: navigate, wait, query,
//! scroll and click. Each run owns exactly one surface and closes it on every
//! exit path.
//!
//! Implementations:
//!
//! - [`scripted::ScriptedSurface`] - replays a fixed sequence of HTML pages
//! - `chrome::ChromeSurface` - a headless Chrome tab (feature `headless`)

#[cfg(feature = "headless")]
pub mod chrome;
pub mod scripted;

use async_trait::async_trait;
use scraper::Html;
use std::time::Duration;
use url::Url;

use crate::utils::error::RenderError;

pub use scripted::{ScriptedSurface, SurfaceLog};

/// Snapshot of one rendered element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSnapshot {
    outer_html: String,
}

impl ElementSnapshot {
    pub fn new(outer_html: impl Into<String>) -> Self {
        Self {
            outer_html: outer_html.into(),
        }
    }

    pub fn outer_html(&self) -> &str {
        &self.outer_html
    }

    /// Parse the element's markup as a standalone fragment
    ///
    /// The returned document is not `Send`; keep it out of `.await` scopes.
    pub fn fragment(&self) -> Html {
        Html::parse_fragment(&self.outer_html)
    }
}

/// Browser capability consumed by the extraction engine
#[async_trait]
pub trait RenderSurface: Send {
    /// Load a URL in the surface
    async fn navigate(&mut self, url: &Url) -> Result<(), RenderError>;

    /// Wait until the current document finished loading
    async fn wait_for_load(&mut self, timeout: Duration) -> Result<(), RenderError>;

    /// Wait until at least one element matches `selector`
    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration)
        -> Result<(), RenderError>;

    /// Snapshot every element currently matching `selector`, in document order
    async fn query_all(&mut self, selector: &str) -> Result<Vec<ElementSnapshot>, RenderError>;

    /// Scroll the viewport to the bottom of the document
    async fn scroll_to_bottom(&mut self) -> Result<(), RenderError>;

    /// Click the first element matching `selector`
    ///
    /// Returns [`RenderError::ElementNotFound`] when nothing matches.
    async fn click(&mut self, selector: &str) -> Result<(), RenderError>;

    /// Release the surface; later calls fail with [`RenderError::Closed`]
    async fn close(&mut self) -> Result<(), RenderError>;
}
