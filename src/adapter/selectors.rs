//! CSS selectors for the review markup of each platform
//!
//! Every field has an ordered fallback list; the first selector yielding
//! non-empty text wins. A selector may name an attribute (`content`,
//! `datetime`, `aria-label`) that is preferred over the element's text.

use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};

use crate::parser::sanitize::has_content;

// Helper macro to parse selectors safely at compile time
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

macro_rules! field {
    ($s:expr) => {
        FieldSelector {
            selector: parse_selector!($s),
            attr: None,
        }
    };
    ($s:expr, $attr:expr) => {
        FieldSelector {
            selector: parse_selector!($s),
            attr: Some($attr),
        }
    };
}

/// One entry of a field's fallback list
#[derive(Debug)]
pub struct FieldSelector {
    pub selector: Selector,
    /// Attribute read before falling back to the element text
    pub attr: Option<&'static str>,
}

impl FieldSelector {
    fn extract(&self, element: ElementRef<'_>) -> Option<String> {
        if let Some(value) = self.attr.and_then(|attr| element.value().attr(attr)) {
            if has_content(value) {
                return Some(value.to_string());
            }
        }

        let text = element.text().collect::<Vec<_>>().join(" ");
        has_content(&text).then_some(text)
    }
}

lazy_static! {
    // G2 (schema.org microdata)
    static ref G2_TITLE: Vec<FieldSelector> = vec![
        field!("h3[itemprop='name']"),
        field!("[itemprop='name'][class*='title']"),
        field!("div.m-0.l2"),
    ];

    static ref G2_DESCRIPTION: Vec<FieldSelector> = vec![
        field!("[itemprop='reviewBody']"),
        field!("div.formatted-text"),
    ];

    static ref G2_DATE: Vec<FieldSelector> = vec![
        field!("meta[itemprop='datePublished']", "content"),
        field!("time", "datetime"),
        field!(".time-stamp"),
    ];

    static ref G2_RATING: Vec<FieldSelector> = vec![
        field!("meta[itemprop='ratingValue']", "content"),
        field!("[class*='stars'][aria-label]", "aria-label"),
    ];

    static ref G2_REVIEWER: Vec<FieldSelector> = vec![
        field!("[itemprop='author'] meta[itemprop='name']", "content"),
        field!("[itemprop='author'] [itemprop='name']"),
        field!("[itemprop='author']"),
    ];

    // Capterra
    static ref CAPTERRA_TITLE: Vec<FieldSelector> = vec![
        field!("[data-testid='review-title']"),
        field!("h3.review-card-title"),
    ];

    static ref CAPTERRA_DESCRIPTION: Vec<FieldSelector> = vec![
        field!("[data-testid='review-text']"),
        field!("div.review-card-text"),
    ];

    static ref CAPTERRA_DATE: Vec<FieldSelector> = vec![
        field!("[data-testid='review-date']"),
        field!("span.review-date"),
    ];

    static ref CAPTERRA_RATING: Vec<FieldSelector> = vec![
        field!("[data-testid='rating'][aria-label]", "aria-label"),
        field!("[data-testid='rating']"),
        field!("span.star-rating-label"),
    ];

    static ref CAPTERRA_REVIEWER: Vec<FieldSelector> = vec![
        field!("[data-testid='reviewer-full-name']"),
        field!("span.reviewer-name"),
    ];

    // TrustRadius
    static ref TRUSTRADIUS_TITLE: Vec<FieldSelector> = vec![
        field!("h4.review-title"),
        field!("a[class*='ReviewTitle']"),
    ];

    static ref TRUSTRADIUS_DESCRIPTION: Vec<FieldSelector> = vec![
        field!("div.review-content"),
        field!("div[class*='ReviewAnswer']"),
    ];

    static ref TRUSTRADIUS_DATE: Vec<FieldSelector> = vec![
        field!("time", "datetime"),
        field!("span.review-date"),
        field!("div[class*='ReviewDate']"),
    ];

    static ref TRUSTRADIUS_RATING: Vec<FieldSelector> = vec![
        field!("[class*='trust-score'][aria-label]", "aria-label"),
        field!("span.trust-score__score"),
    ];

    static ref TRUSTRADIUS_REVIEWER: Vec<FieldSelector> = vec![
        field!("span.reviewer-name"),
        field!("a[class*='ReviewerName']"),
    ];

    // Card heuristics shared by every platform
    static ref GENERIC_TITLE: Vec<FieldSelector> = vec![
        field!("h1, h2, h3"),
        field!(".review-title"),
        field!("[class*='title']"),
    ];

    static ref GENERIC_DESCRIPTION: Vec<FieldSelector> = vec![
        field!(".review-text, .review-body"),
        field!("[class*='comment']"),
        field!("[class*='content']"),
        field!("p"),
    ];

    static ref GENERIC_DATE: Vec<FieldSelector> = vec![
        field!("time", "datetime"),
        field!("[class*='date']"),
        field!("[class*='posted']"),
    ];

    static ref GENERIC_RATING: Vec<FieldSelector> = vec![
        field!("[aria-label*='star']", "aria-label"),
        field!("[class*='rating']"),
        field!("[class*='stars']"),
    ];

    static ref GENERIC_REVIEWER: Vec<FieldSelector> = vec![
        field!("[class*='author']"),
        field!("[class*='reviewer']"),
        field!("[class*='user']"),
    ];

    static ref G2: SiteSelectors = SiteSelectors {
        review: "div[itemprop='review']",
        title: &G2_TITLE,
        description: &G2_DESCRIPTION,
        date: &G2_DATE,
        rating: &G2_RATING,
        reviewer: &G2_REVIEWER,
    };

    static ref CAPTERRA: SiteSelectors = SiteSelectors {
        review: "div[data-testid='review-card'], div.review-card",
        title: &CAPTERRA_TITLE,
        description: &CAPTERRA_DESCRIPTION,
        date: &CAPTERRA_DATE,
        rating: &CAPTERRA_RATING,
        reviewer: &CAPTERRA_REVIEWER,
    };

    static ref TRUSTRADIUS: SiteSelectors = SiteSelectors {
        review: "article.review, div[class*='ReviewCard']",
        title: &TRUSTRADIUS_TITLE,
        description: &TRUSTRADIUS_DESCRIPTION,
        date: &TRUSTRADIUS_DATE,
        rating: &TRUSTRADIUS_RATING,
        reviewer: &TRUSTRADIUS_REVIEWER,
    };

    static ref GENERIC: SiteSelectors = SiteSelectors {
        review: "[class*='review'], [data-testid*='review'], article",
        title: &GENERIC_TITLE,
        description: &GENERIC_DESCRIPTION,
        date: &GENERIC_DATE,
        rating: &GENERIC_RATING,
        reviewer: &GENERIC_REVIEWER,
    };
}

/// Review block selector plus per-field fallback lists for one platform
#[derive(Debug)]
pub struct SiteSelectors {
    /// Selector matching one review block, passed to the rendering surface
    pub review: &'static str,
    pub title: &'static [FieldSelector],
    pub description: &'static [FieldSelector],
    pub date: &'static [FieldSelector],
    pub rating: &'static [FieldSelector],
    pub reviewer: &'static [FieldSelector],
}

impl SiteSelectors {
    pub fn g2() -> &'static Self {
        &G2
    }

    pub fn capterra() -> &'static Self {
        &CAPTERRA
    }

    pub fn trustradius() -> &'static Self {
        &TRUSTRADIUS
    }

    /// Card heuristics used when a site selector misses
    pub fn generic() -> &'static Self {
        &GENERIC
    }
}

/// Extract the first non-empty value from a list of selectors
pub fn first_match(document: &Html, selectors: &[FieldSelector]) -> Option<String> {
    selectors.iter().find_map(|field| {
        document
            .select(&field.selector)
            .find_map(|element| field.extract(element))
    })
}

/// Non-empty text lines of a fragment, in document order
pub fn text_lines(document: &Html) -> Vec<String> {
    document
        .root_element()
        .text()
        .flat_map(str::lines)
        .map(str::trim)
        .filter(|line| has_content(line))
        .map(String::from)
        .collect()
}
