//! In-memory rendering surface replaying a fixed sequence of pages
//!
//! Each entry of the script is an HTML body fragment representing one batch
//! of content. Navigation shows the first batch; pagination actions reveal
//! the next one, either appended below the current content (infinite scroll
//! and "load more") or replacing it (numbered pages).
//!
//! Used for offline replays of saved pages and throughout the test suite.

use async_trait::async_trait;
use scraper::{Html, Selector};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use url::Url;

use crate::surface::{ElementSnapshot, RenderSurface};
use crate::utils::error::RenderError;

/// How revealed batches combine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptMode {
    /// New batches are appended to the document
    Append,
    /// Each batch replaces the previous document
    Replace,
}

/// Interaction counters shared between a surface and its observers
#[derive(Debug, Clone, Default)]
pub struct SurfaceLog {
    inner: Arc<Mutex<LogEntries>>,
}

#[derive(Debug, Default)]
struct LogEntries {
    navigations: Vec<String>,
    scrolls: u32,
    clicks: u32,
    closed: bool,
}

impl SurfaceLog {
    fn entries(&self) -> MutexGuard<'_, LogEntries> {
        // A poisoned log only means a test thread panicked mid-update
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// URLs passed to `navigate`, including failed attempts
    pub fn navigations(&self) -> Vec<String> {
        self.entries().navigations.clone()
    }

    pub fn scrolls(&self) -> u32 {
        self.entries().scrolls
    }

    pub fn clicks(&self) -> u32 {
        self.entries().clicks
    }

    pub fn is_closed(&self) -> bool {
        self.entries().closed
    }
}

/// Surface that serves pre-recorded HTML batches
#[derive(Debug)]
pub struct ScriptedSurface {
    pages: Vec<String>,
    mode: ScriptMode,
    revealed: usize,
    loaded: Option<Url>,
    failing_navigations: u32,
    closed: bool,
    log: SurfaceLog,
}

impl ScriptedSurface {
    /// Create a surface over `pages` combined according to `mode`
    pub fn new(pages: Vec<String>, mode: ScriptMode) -> Self {
        Self {
            pages,
            mode,
            revealed: 0,
            loaded: None,
            failing_navigations: 0,
            closed: false,
            log: SurfaceLog::default(),
        }
    }

    /// Batches are appended (infinite scroll / "load more")
    pub fn appending<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(pages.into_iter().map(Into::into).collect(), ScriptMode::Append)
    }

    /// Batches replace each other (numbered pages)
    pub fn paged<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(pages.into_iter().map(Into::into).collect(), ScriptMode::Replace)
    }

    /// Load every `*.html` file of a directory, in file name order
    pub fn from_dir(dir: &Path, mode: ScriptMode) -> std::io::Result<Self> {
        let mut paths = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "html"))
            .collect::<Vec<_>>();
        paths.sort();

        let pages = paths
            .iter()
            .map(std::fs::read_to_string)
            .collect::<std::io::Result<Vec<_>>>()?;

        tracing::debug!(dir = %dir.display(), pages = pages.len(), "Loaded replay pages");
        Ok(Self::new(pages, mode))
    }

    /// Fail the next `count` navigations with a network error
    #[must_use]
    pub fn with_navigation_failures(mut self, count: u32) -> Self {
        self.failing_navigations = count;
        self
    }

    /// Handle for inspecting interactions after the surface was moved
    pub fn log(&self) -> SurfaceLog {
        self.log.clone()
    }

    fn ensure_open(&self) -> Result<(), RenderError> {
        if self.closed {
            return Err(RenderError::Closed);
        }
        Ok(())
    }

    fn current_body(&self) -> String {
        match self.mode {
            ScriptMode::Append => self.pages[..self.revealed].concat(),
            ScriptMode::Replace => self
                .revealed
                .checked_sub(1)
                .and_then(|i| self.pages.get(i))
                .cloned()
                .unwrap_or_default(),
        }
    }

    fn select(&self, selector: &str) -> Result<Vec<ElementSnapshot>, RenderError> {
        let selector = Selector::parse(selector)
            .map_err(|e| RenderError::InvalidSelector(format!("{selector}: {e}")))?;
        let document = Html::parse_document(&format!(
            "<html><body>{}</body></html>",
            self.current_body()
        ));

        Ok(document
            .select(&selector)
            .map(|element| ElementSnapshot::new(element.html()))
            .collect())
    }

    fn reveal_next(&mut self) {
        if self.revealed < self.pages.len() {
            self.revealed += 1;
        }
    }
}

#[async_trait]
impl RenderSurface for ScriptedSurface {
    async fn navigate(&mut self, url: &Url) -> Result<(), RenderError> {
        self.ensure_open()?;
        self.log.entries().navigations.push(url.to_string());

        if self.failing_navigations > 0 {
            self.failing_navigations -= 1;
            return Err(RenderError::Navigation(format!(
                "simulated network failure for {url}"
            )));
        }

        self.loaded = Some(url.clone());
        self.revealed = self.pages.len().min(1);
        Ok(())
    }

    async fn wait_for_load(&mut self, _timeout: Duration) -> Result<(), RenderError> {
        self.ensure_open()?;
        match self.loaded {
            Some(_) => Ok(()),
            None => Err(RenderError::Navigation("no page loaded".into())),
        }
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), RenderError> {
        self.ensure_open()?;
        if self.select(selector)?.is_empty() {
            return Err(RenderError::timeout(selector, timeout.as_millis() as u64));
        }
        Ok(())
    }

    async fn query_all(&mut self, selector: &str) -> Result<Vec<ElementSnapshot>, RenderError> {
        self.ensure_open()?;
        self.select(selector)
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), RenderError> {
        self.ensure_open()?;
        self.log.entries().scrolls += 1;
        if self.mode == ScriptMode::Append {
            self.reveal_next();
        }
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> Result<(), RenderError> {
        self.ensure_open()?;
        if self.select(selector)?.is_empty() {
            return Err(RenderError::ElementNotFound(selector.to_string()));
        }
        self.log.entries().clicks += 1;
        self.reveal_next();
        Ok(())
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        self.closed = true;
        self.log.entries().closed = true;
        Ok(())
    }
}
