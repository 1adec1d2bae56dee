//! Common test utilities

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use std::fs;

use revharvest::config::ScraperConfig;
use revharvest::engine::ExtractionEngine;
use revharvest::models::DateWindow;

/// Test fixture paths
pub const FIXTURES_DIR: &str = "tests/fixtures/html";

pub fn load_fixture(filename: &str) -> String {
    let path = format!("{FIXTURES_DIR}/{filename}");
    fs::read_to_string(&path).unwrap_or_else(|_| panic!("Failed to load fixture: {path}"))
}

/// Scraper settings with millisecond waits
pub fn fast_config() -> ScraperConfig {
    ScraperConfig {
        max_steps: 40,
        stall_attempts: 2,
        render_timeout_ms: 5,
        poll_interval_ms: 1,
        settle_ms: 0,
        navigation_timeout_secs: 1,
        navigation_retries: 2,
        retry_base_delay_ms: 1,
        retry_max_delay_ms: 5,
        keep_unparseable: true,
    }
}

/// Fixed "now" used to resolve relative dates
pub fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

pub fn engine() -> ExtractionEngine {
    ExtractionEngine::with_reference_time(fast_config(), reference_time())
}

pub fn engine_with(config: ScraperConfig) -> ExtractionEngine {
    ExtractionEngine::with_reference_time(config, reference_time())
}

pub fn january_2024() -> DateWindow {
    DateWindow::parse("2024-01-01", "2024-01-31").unwrap()
}

/// One G2 review block with an ISO publication date
pub fn g2_review(title: &str, date: &str) -> String {
    format!(
        r#"<div itemprop="review">
  <div itemprop="author"><meta itemprop="name" content="Reviewer of {title}"></div>
  <meta itemprop="datePublished" content="{date}">
  <div itemprop="reviewRating"><meta itemprop="ratingValue" content="4"></div>
  <h3 itemprop="name">{title}</h3>
  <div itemprop="reviewBody"><p>Body of {title}.</p></div>
</div>"#
    )
}

/// A G2 listing page, optionally linking to a next page
pub fn g2_page(reviews: &[String], has_next: bool) -> String {
    let next = if has_next {
        r#"<a class="pagination__named-link" rel="next" href="?page=next">Next</a>"#
    } else {
        ""
    };
    format!("<div class=\"reviews\">{}</div>{next}", reviews.concat())
}

/// One TrustRadius review article with free-form date text
pub fn trustradius_review(title: &str, date_text: &str) -> String {
    format!(
        r#"<article class="review">
  <h4 class="review-title">{title}</h4>
  <span class="reviewer-name">Reviewer of {title}</span>
  <span class="review-date">{date_text}</span>
  <div class="review-content">Body of {title}.</div>
</article>"#
    )
}

/// One Capterra review card
pub fn capterra_card(title: &str, date_text: &str) -> String {
    format!(
        r#"<div data-testid="review-card">
  <h3 data-testid="review-title">{title}</h3>
  <span data-testid="review-date">{date_text}</span>
  <div data-testid="review-text">Body of {title}.</div>
</div>"#
    )
}

pub const CAPTERRA_LOAD_MORE: &str =
    r#"<button data-testid="load-more-reviews">Show more reviews</button>"#;
