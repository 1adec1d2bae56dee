//! Extraction engine
//!
//! One run walks `Start -> Loading -> Extracting -> Done`:
//!
//! - `Start` validates the slug and resolves the listing URLs
//! - `Loading` opens the listing, retrying navigation with backoff
//! - `Extracting` hands the page to the [`PaginationDriver`]
//! - `Done` returns the [`ResultSet`]
//!
//! The engine owns the rendering surface for the whole run and closes it on
//! every exit path.

pub mod driver;
pub mod pagination;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::adapter::{adapter_for, SiteAdapter};
use crate::config::ScraperConfig;
use crate::models::{DateWindow, ResultSet, Source};
use crate::parser::date::DateParser;
use crate::parser::normalize::RecordNormalizer;
use crate::surface::RenderSurface;
use crate::utils::error::{RenderError, ScrapeError};
use crate::utils::retry::{with_retry_if, RetryConfig};

pub use driver::PaginationDriver;
pub use pagination::{PageSignature, PaginationMode};

/// Parameters of one extraction run
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub company_slug: String,
    pub window: DateWindow,
    pub source: Source,
}

impl RunRequest {
    pub fn new(company_slug: impl Into<String>, window: DateWindow, source: Source) -> Self {
        Self {
            company_slug: company_slug.into(),
            window,
            source,
        }
    }
}

/// Phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Start,
    Loading,
    Extracting,
    Done,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Start => "start",
            Self::Loading => "loading",
            Self::Extracting => "extracting",
            Self::Done => "done",
        };
        write!(f, "{label}")
    }
}

/// Runs review extractions against a rendering surface
#[derive(Debug, Clone)]
pub struct ExtractionEngine {
    config: ScraperConfig,
    reference: DateTime<Utc>,
}

impl ExtractionEngine {
    /// Create an engine resolving relative dates against the current time
    pub fn new(config: ScraperConfig) -> Self {
        Self::with_reference_time(config, Utc::now())
    }

    /// Create an engine with a fixed reference time for relative dates
    pub fn with_reference_time(config: ScraperConfig, reference: DateTime<Utc>) -> Self {
        Self { config, reference }
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Run an extraction with the adapter registered for the request's source
    pub async fn run<S: RenderSurface>(
        &self,
        surface: S,
        request: &RunRequest,
    ) -> Result<ResultSet, ScrapeError> {
        let adapter = adapter_for(request.source);
        self.run_with_adapter(surface, request, adapter.as_ref())
            .await
    }

    /// Run an extraction with an explicit adapter
    ///
    /// The surface is consumed and closed before returning, whether the run
    /// succeeded or not.
    #[instrument(skip(self, surface, adapter), fields(source = %request.source, company = %request.company_slug))]
    pub async fn run_with_adapter<S: RenderSurface>(
        &self,
        mut surface: S,
        request: &RunRequest,
        adapter: &dyn SiteAdapter,
    ) -> Result<ResultSet, ScrapeError> {
        let outcome = self.execute(&mut surface, request, adapter).await;

        if let Err(e) = surface.close().await {
            warn!(error = %e, "Failed to close rendering surface");
        }

        match &outcome {
            Ok(results) => info!(
                records = results.len(),
                unparseable = results.unparseable_count(),
                steps = results.stats().steps,
                "Run finished"
            ),
            Err(e) => warn!(error = %e, "Run failed"),
        }
        outcome
    }

    async fn execute(
        &self,
        surface: &mut dyn RenderSurface,
        request: &RunRequest,
        adapter: &dyn SiteAdapter,
    ) -> Result<ResultSet, ScrapeError> {
        transition(RunState::Start);
        validate_slug(&request.company_slug)?;
        if adapter.source() != request.source {
            return Err(ScrapeError::invalid_input(format!(
                "adapter for {} cannot serve source {}",
                adapter.source(),
                request.source
            )));
        }

        let primary = adapter
            .build_listing_url(&request.company_slug)
            .map_err(|e| ScrapeError::invalid_input(format!("cannot build listing URL: {e}")))?;
        let mut candidates = vec![primary];
        candidates.extend(adapter.alternate_listing_urls(&request.company_slug));

        transition(RunState::Loading);
        self.load(surface, adapter, &candidates).await?;

        transition(RunState::Extracting);
        let mut results = ResultSet::new(adapter.source(), &request.company_slug, request.window);
        let normalizer = RecordNormalizer::new(
            DateParser::new(self.reference).with_formats(adapter.date_formats()),
        );
        PaginationDriver::new(&self.config, &normalizer)
            .run(surface, adapter, &mut results)
            .await?;

        transition(RunState::Done);
        Ok(results)
    }

    /// Open the first listing URL that loads, retrying each one
    async fn load(
        &self,
        surface: &mut dyn RenderSurface,
        adapter: &dyn SiteAdapter,
        candidates: &[Url],
    ) -> Result<(), ScrapeError> {
        let retry = RetryConfig::with_delays(
            self.config.navigation_retries,
            self.config.retry_base_delay_ms,
            self.config.retry_max_delay_ms,
        );
        let load_timeout = self.config.navigation_timeout();
        let mut last_failure = None;

        for url in candidates {
            info!(url = %url, "Opening listing page");
            let attempt = with_retry_if(
                &retry,
                surface,
                |surface| {
                    let url = url.clone();
                    Box::pin(async move {
                        surface.navigate(&url).await?;
                        surface.wait_for_load(load_timeout).await
                    })
                },
                RenderError::is_recoverable,
            )
            .await;

            match attempt {
                Ok(()) => {
                    let selector = adapter.review_selector();
                    if let Err(e) = surface
                        .wait_for_selector(selector, self.config.render_timeout())
                        .await
                    {
                        // An empty listing is a valid outcome
                        debug!(error = %e, "No review blocks rendered after load");
                    }
                    return Ok(());
                }
                Err(failure) => {
                    warn!(url = %url, attempts = failure.attempts, "Listing page failed to load");
                    last_failure = Some((url.to_string(), failure));
                }
            }
        }

        match last_failure {
            Some((url, failure)) => Err(ScrapeError::NavigationFailed {
                url,
                attempts: failure.attempts,
                source: failure.last_error,
            }),
            None => Err(ScrapeError::invalid_input("no listing URL to open")),
        }
    }
}

fn transition(state: RunState) {
    debug!(state = %state, "Run state");
}

/// Check a company slug is a single URL path segment
fn validate_slug(slug: &str) -> Result<(), ScrapeError> {
    if slug.trim().is_empty() {
        return Err(ScrapeError::invalid_input("company slug is empty"));
    }

    let valid = slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if !valid || slug.starts_with('.') {
        return Err(ScrapeError::invalid_input(format!(
            "company slug '{slug}' may only contain letters, digits, '-', '_' and '.'"
        )));
    }
    Ok(())
}
