//! End-to-end runs of the extraction engine over scripted surfaces

mod common;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use std::sync::atomic::{AtomicU32, Ordering};
use url::Url;

use revharvest::adapter::{Advance, PageCursor, SiteAdapter, SiteSelectors};
use revharvest::config::ScraperConfig;
use revharvest::engine::{PaginationMode, RunRequest};
use revharvest::models::{Rating, Source, StopReason};
use revharvest::parser::normalize::{FieldKey, RawField};
use revharvest::surface::{RenderSurface, ScriptedSurface};
use revharvest::utils::error::{RenderError, ScrapeError};

use common::*;

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Adapter producing `per_batch` reviews per step, dated backwards from
/// `newest` in steps of `gap_days`
struct SyntheticAdapter {
    newest: NaiveDate,
    gap_days: u64,
    per_batch: u64,
    advances: AtomicU32,
}

impl SyntheticAdapter {
    fn new(newest: &str, gap_days: u64, per_batch: u64) -> Self {
        Self {
            newest: day(newest),
            gap_days,
            per_batch,
            advances: AtomicU32::new(0),
        }
    }

    fn advances(&self) -> u32 {
        self.advances.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SiteAdapter for SyntheticAdapter {
    fn source(&self) -> Source {
        Source::G2
    }

    fn build_listing_url(&self, company_slug: &str) -> Result<Url, url::ParseError> {
        Url::parse("https://reviews.example.com/products/")?.join(company_slug)
    }

    fn selectors(&self) -> &'static SiteSelectors {
        SiteSelectors::generic()
    }

    fn pagination(&self) -> PaginationMode {
        PaginationMode::InfiniteScroll
    }

    async fn extract_visible_reviews(
        &self,
        _surface: &mut dyn RenderSurface,
        cursor: &PageCursor,
    ) -> Result<Vec<RawField>, RenderError> {
        let batch = u64::from(cursor.page);
        Ok((0..self.per_batch)
            .map(|i| {
                let offset = (batch * self.per_batch + i) * self.gap_days;
                let date = self.newest - Days::new(offset);
                RawField::new()
                    .with(FieldKey::Title, format!("Review {batch}-{i}"))
                    .with(FieldKey::Description, "Synthetic body")
                    .with(FieldKey::Date, date.format("%Y-%m-%d").to_string())
            })
            .collect())
    }

    async fn advance(
        &self,
        _surface: &mut dyn RenderSurface,
        mut cursor: PageCursor,
        _config: &ScraperConfig,
    ) -> Result<Advance, RenderError> {
        self.advances.fetch_add(1, Ordering::SeqCst);
        cursor.page += 1;
        cursor.seen = 0;
        Ok(Advance::more(cursor))
    }
}

fn listing_surface() -> ScriptedSurface {
    ScriptedSurface::appending(["<p>listing</p>"])
}

// ============================================================================
// Platform scenarios
// ============================================================================

#[tokio::test]
async fn test_g2_three_pages_keeps_only_window_record() {
    let surface = ScriptedSurface::paged([
        g2_page(&[g2_review("February review", "2024-02-01")], true),
        g2_page(&[g2_review("January review", "2024-01-15")], true),
        g2_page(&[g2_review("December review", "2023-12-20")], true),
        g2_page(&[g2_review("November review", "2023-11-02")], false),
    ]);
    let log = surface.log();
    let request = RunRequest::new("acme-crm", january_2024(), Source::G2);

    let results = engine().run(surface, &request).await.unwrap();

    assert_eq!(results.len(), 1);
    let record = &results.records()[0];
    assert_eq!(record.title, "January review");
    assert_eq!(record.date, Some(day("2024-01-15")));
    assert_eq!(record.rating, Some(Rating::Score(4.0)));
    assert_eq!(record.source, Source::G2);

    let stats = results.stats();
    assert_eq!(stats.steps, 3);
    assert_eq!(stats.advances, 2);
    assert_eq!(stats.out_of_window, 2);
    assert_eq!(stats.stop_reason, Some(StopReason::WindowExhausted));

    assert_eq!(log.clicks(), 2);
    assert_eq!(
        log.navigations(),
        vec!["https://www.g2.com/products/acme-crm/reviews"]
    );
    assert!(log.is_closed());
}

#[tokio::test]
async fn test_empty_first_page_completes_without_error() {
    let surface = ScriptedSurface::appending(["<div class=\"empty\">No reviews yet</div>"]);
    let log = surface.log();
    let request = RunRequest::new("acme-crm", january_2024(), Source::TrustRadius);

    let results = engine().run(surface, &request).await.unwrap();

    assert!(results.is_empty());
    assert_eq!(results.unparseable_count(), 0);
    assert_eq!(results.stats().advances, 1);
    assert_eq!(
        results.stats().stop_reason,
        Some(StopReason::ContentExhausted)
    );
    assert!(log.is_closed());
}

#[tokio::test]
async fn test_unparseable_date_is_kept_and_counted() {
    let surface = ScriptedSurface::appending([format!(
        "{}{}",
        trustradius_review("Dated", "January 12, 2024"),
        trustradius_review("Undated", "Great product"),
    )]);
    let request = RunRequest::new("acme-crm", january_2024(), Source::TrustRadius);

    let results = engine().run(surface, &request).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results.unparseable_count(), 1);

    let undated = &results.records()[1];
    assert_eq!(undated.title, "Undated");
    assert_eq!(undated.date, None);
    assert_eq!(undated.raw_date.as_deref(), Some("Great product"));
}

#[tokio::test]
async fn test_undated_batch_does_not_stop_paging() {
    let surface = ScriptedSurface::appending([
        format!(
            "{}{}",
            trustradius_review("Undated first", "Great product"),
            trustradius_review("Undated second", "Top rated"),
        ),
        format!(
            "{}{}",
            trustradius_review("Recent", "January 20, 2024"),
            trustradius_review("Earlier", "January 8, 2024"),
        ),
        trustradius_review("Old", "December 30, 2023"),
    ]);
    let log = surface.log();
    let request = RunRequest::new("acme-crm", january_2024(), Source::TrustRadius);

    let results = engine().run(surface, &request).await.unwrap();

    let titles: Vec<_> = results.records().iter().map(|r| r.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Undated first", "Undated second", "Recent", "Earlier"]
    );
    assert_eq!(results.unparseable_count(), 2);
    assert_eq!(results.stats().advances, 2);
    assert_eq!(results.stats().out_of_window, 1);
    assert_eq!(
        results.stats().stop_reason,
        Some(StopReason::WindowExhausted)
    );
    assert_eq!(log.scrolls(), 2);
}

#[tokio::test]
async fn test_nested_card_components_are_one_review() {
    let card = r#"<div class="ReviewCard_card__a1">
  <div class="ReviewCardHeader_root__b2">
    <h3>Solid</h3>
    <time datetime="2024-01-10">Jan 10</time>
  </div>
  <p>Body text here.</p>
</div>"#;
    let surface = ScriptedSurface::appending([card]);
    let request = RunRequest::new("acme-crm", january_2024(), Source::TrustRadius);

    let results = engine().run(surface, &request).await.unwrap();

    assert_eq!(results.len(), 1);
    let record = &results.records()[0];
    assert_eq!(record.title, "Solid");
    assert_eq!(record.description, "Body text here.");
    assert_eq!(record.date, Some(day("2024-01-10")));
    assert_eq!(results.stats().blocks_seen, 1);
}

#[tokio::test]
async fn test_unparseable_date_dropped_when_configured() {
    let surface = ScriptedSurface::appending([trustradius_review("Undated", "Great product")]);
    let request = RunRequest::new("acme-crm", january_2024(), Source::TrustRadius);
    let config = ScraperConfig {
        keep_unparseable: false,
        ..fast_config()
    };

    let results = engine_with(config).run(surface, &request).await.unwrap();

    assert!(results.is_empty());
    assert_eq!(results.unparseable_count(), 1);
}

#[tokio::test]
async fn test_capterra_load_more_until_window_exhausted() {
    let surface = ScriptedSurface::appending([
        format!(
            "{}{}{CAPTERRA_LOAD_MORE}",
            capterra_card("Newest", "January 20, 2024"),
            capterra_card("Middle", "Jan 10, 2024"),
        ),
        capterra_card("Oldest", "December 28, 2023"),
    ]);
    let log = surface.log();
    let request = RunRequest::new("acme-crm", january_2024(), Source::Capterra);

    let results = engine().run(surface, &request).await.unwrap();

    let titles: Vec<_> = results.records().iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Newest", "Middle"]);
    assert_eq!(results.stats().out_of_window, 1);
    assert_eq!(
        results.stats().stop_reason,
        Some(StopReason::WindowExhausted)
    );
    assert_eq!(log.clicks(), 1);
    assert_eq!(log.scrolls(), 0);
}

#[tokio::test]
async fn test_missing_fields_are_counted_not_fatal() {
    let surface = ScriptedSurface::appending([trustradius_review("Partial", "2024-01-05")]);
    let request = RunRequest::new("acme-crm", january_2024(), Source::TrustRadius);

    let results = engine().run(surface, &request).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results.records()[0].rating, None);
    assert_eq!(results.stats().field_mismatches, 1);
}

// ============================================================================
// Stop conditions
// ============================================================================

#[tokio::test]
async fn test_decreasing_dates_stop_without_extra_advance() {
    let adapter = SyntheticAdapter::new("2024-02-10", 5, 2);
    let request = RunRequest::new("acme-crm", january_2024(), Source::G2);

    let results = engine()
        .run_with_adapter(listing_surface(), &request, &adapter)
        .await
        .unwrap();

    // Batches: 02-10/02-05, 01-31/01-26, 01-21/01-16, 01-11/01-06, 01-01/12-27
    assert_eq!(adapter.advances(), 4);
    assert_eq!(results.stats().steps, 5);
    assert_eq!(results.len(), 7);
    assert_eq!(
        results.stats().stop_reason,
        Some(StopReason::WindowExhausted)
    );
}

#[tokio::test]
async fn test_step_ceiling_bounds_endless_growth() {
    let adapter = SyntheticAdapter::new("2024-01-15", 0, 1);
    let request = RunRequest::new("acme-crm", january_2024(), Source::G2);
    let config = ScraperConfig {
        max_steps: 6,
        ..fast_config()
    };

    let results = engine_with(config)
        .run_with_adapter(listing_surface(), &request, &adapter)
        .await
        .unwrap();

    assert_eq!(results.stats().stop_reason, Some(StopReason::StepLimit));
    assert_eq!(results.stats().steps, 6);
    assert_eq!(adapter.advances(), 5);
    assert_eq!(results.len(), 6);
}

#[tokio::test]
async fn test_records_always_inside_window() {
    let adapter = SyntheticAdapter::new("2024-03-01", 3, 4);
    let window = january_2024();
    let request = RunRequest::new("acme-crm", window, Source::G2);

    let results = engine()
        .run_with_adapter(listing_surface(), &request, &adapter)
        .await
        .unwrap();

    assert!(!results.is_empty());
    for record in results.records() {
        let date = record.date.unwrap();
        assert!(window.contains(date), "{date} outside {window}");
    }
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_navigation_failure_after_retries() {
    let surface = ScriptedSurface::appending(["<p>never shown</p>"]).with_navigation_failures(100);
    let log = surface.log();
    let request = RunRequest::new("acme-crm", january_2024(), Source::G2);

    let err = engine().run(surface, &request).await.unwrap_err();

    match err {
        ScrapeError::NavigationFailed { url, attempts, .. } => {
            assert_eq!(url, "https://www.g2.com/products/acme-crm/reviews");
            assert_eq!(attempts, 3);
        }
        other => panic!("expected NavigationFailed, got {other:?}"),
    }
    assert_eq!(log.navigations().len(), 3);
    assert!(log.is_closed());
}

#[tokio::test]
async fn test_capterra_tries_alternate_url() {
    let surface = ScriptedSurface::appending(["<p>never shown</p>"]).with_navigation_failures(100);
    let log = surface.log();
    let request = RunRequest::new("acme-crm", january_2024(), Source::Capterra);

    let err = engine().run(surface, &request).await.unwrap_err();

    assert!(
        matches!(&err, ScrapeError::NavigationFailed { url, .. } if url == "https://www.capterra.com/p/acme-crm/")
    );
    let navigations = log.navigations();
    assert_eq!(navigations.len(), 6);
    assert_eq!(navigations[0], "https://www.capterra.com/p/acme-crm/reviews/");
    assert_eq!(navigations[5], "https://www.capterra.com/p/acme-crm/");
}

#[tokio::test]
async fn test_transient_navigation_failure_recovers() {
    let surface = ScriptedSurface::paged([g2_page(&[g2_review("Only", "2024-01-03")], false)])
        .with_navigation_failures(1);
    let log = surface.log();
    let request = RunRequest::new("acme-crm", january_2024(), Source::G2);

    let results = engine().run(surface, &request).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(log.navigations().len(), 2);
    assert_eq!(
        results.stats().stop_reason,
        Some(StopReason::ContentExhausted)
    );
}

#[tokio::test]
async fn test_invalid_slug_rejected_before_navigation() {
    for slug in ["", "acme crm", "../admin"] {
        let surface = listing_surface();
        let log = surface.log();
        let request = RunRequest::new(slug, january_2024(), Source::G2);

        let err = engine().run(surface, &request).await.unwrap_err();

        assert!(matches!(err, ScrapeError::InvalidInput(_)), "slug {slug:?}");
        assert!(log.navigations().is_empty());
        assert!(log.is_closed());
    }
}

#[tokio::test]
async fn test_adapter_source_must_match_request() {
    let adapter = SyntheticAdapter::new("2024-01-15", 1, 1);
    let request = RunRequest::new("acme-crm", january_2024(), Source::Capterra);

    let err = engine()
        .run_with_adapter(listing_surface(), &request, &adapter)
        .await
        .unwrap_err();

    assert!(matches!(err, ScrapeError::InvalidInput(_)));
}
