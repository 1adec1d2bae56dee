//! Per-platform review extraction
//!
//! A [`SiteAdapter`] knows one platform's listing URL, review markup and
//! pagination mechanism. The extraction engine only talks to adapters through
//! this trait, so adding a platform means adding one variant here.
//!
//! # Example
//!
//! ```
//! use revharvest::adapter::adapter_for;
//! use revharvest::models::Source;
//!
//! let adapter = adapter_for(Source::G2);
//! let url = adapter.build_listing_url("acme-crm").unwrap();
//! assert_eq!(url.as_str(), "https://www.g2.com/products/acme-crm/reviews");
//! ```

pub mod capterra;
pub mod g2;
pub mod selectors;
pub mod trustradius;

use async_trait::async_trait;
use scraper::Html;
use url::Url;

use crate::config::ScraperConfig;
use crate::engine::pagination::{self, PaginationMode};
use crate::models::Source;
use crate::parser::normalize::{FieldKey, RawField};
use crate::surface::{ElementSnapshot, RenderSurface};
use crate::utils::error::RenderError;

pub use capterra::CapterraAdapter;
pub use g2::G2Adapter;
pub use selectors::{first_match, text_lines, FieldSelector, SiteSelectors};
pub use trustradius::TrustRadiusAdapter;

/// How much of the listing has been loaded so far
///
/// Owned by the pagination driver; adapters only read it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageCursor {
    /// Review blocks of the current document already extracted
    pub seen: usize,
    /// Numbered page currently shown (0 = first)
    pub page: u32,
    /// Scroll actions performed
    pub scrolls: u32,
    /// "Load more" clicks performed
    pub load_more_clicks: u32,
}

/// Outcome of one pagination step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    /// Whether new review blocks appeared
    pub has_more: bool,
    pub cursor: PageCursor,
}

impl Advance {
    pub fn more(cursor: PageCursor) -> Self {
        Self {
            has_more: true,
            cursor,
        }
    }

    pub fn exhausted(cursor: PageCursor) -> Self {
        Self {
            has_more: false,
            cursor,
        }
    }
}

/// Source-specific strategy for navigation and field extraction
#[async_trait]
pub trait SiteAdapter: Send + Sync {
    /// Platform handled by this adapter
    fn source(&self) -> Source;

    /// Listing page URL for a company
    fn build_listing_url(&self, company_slug: &str) -> Result<Url, url::ParseError>;

    /// URLs tried in order when the listing page cannot be opened
    fn alternate_listing_urls(&self, _company_slug: &str) -> Vec<Url> {
        Vec::new()
    }

    /// Review block and field selectors
    fn selectors(&self) -> &'static SiteSelectors;

    /// Pagination mechanism of the listing page
    fn pagination(&self) -> PaginationMode;

    /// Date formats tried before the generic ones
    fn date_formats(&self) -> &'static [&'static str] {
        &[]
    }

    fn review_selector(&self) -> &'static str {
        self.selectors().review
    }

    fn title_field(&self, block: &Html) -> Option<String> {
        field_or_generic(block, self.selectors().title, SiteSelectors::generic().title)
    }

    fn description_field(&self, block: &Html) -> Option<String> {
        field_or_generic(
            block,
            self.selectors().description,
            SiteSelectors::generic().description,
        )
    }

    fn date_field(&self, block: &Html) -> Option<String> {
        field_or_generic(block, self.selectors().date, SiteSelectors::generic().date)
    }

    fn rating_field(&self, block: &Html) -> Option<String> {
        field_or_generic(block, self.selectors().rating, SiteSelectors::generic().rating)
    }

    fn reviewer_field(&self, block: &Html) -> Option<String> {
        field_or_generic(
            block,
            self.selectors().reviewer,
            SiteSelectors::generic().reviewer,
        )
    }

    /// Read every field of one review block
    ///
    /// When the title or description selectors miss, the first text line of
    /// the block becomes the title and the remaining lines the description.
    fn parse_block(&self, block: &ElementSnapshot) -> RawField {
        let fragment = block.fragment();

        let mut title = self.title_field(&fragment);
        let mut description = self.description_field(&fragment);

        if title.is_none() || description.is_none() {
            let lines = text_lines(&fragment);
            if let Some((first, rest)) = lines.split_first() {
                title.get_or_insert_with(|| first.clone());
                if !rest.is_empty() {
                    description.get_or_insert_with(|| rest.join("\n"));
                }
            }
        }

        let mut raw = RawField::new();
        raw.set(FieldKey::Title, title);
        raw.set(FieldKey::Description, description);
        raw.set(FieldKey::Date, self.date_field(&fragment));
        raw.set(FieldKey::Rating, self.rating_field(&fragment));
        raw.set(FieldKey::Reviewer, self.reviewer_field(&fragment));
        raw
    }

    /// Read the review blocks rendered since the cursor's last extraction
    async fn extract_visible_reviews(
        &self,
        surface: &mut dyn RenderSurface,
        cursor: &PageCursor,
    ) -> Result<Vec<RawField>, RenderError> {
        let blocks = outermost(surface.query_all(self.review_selector()).await?);
        Ok(blocks
            .iter()
            .skip(cursor.seen)
            .map(|block| self.parse_block(block))
            .collect())
    }

    /// Perform one pagination step and report whether new content appeared
    async fn advance(
        &self,
        surface: &mut dyn RenderSurface,
        cursor: PageCursor,
        config: &ScraperConfig,
    ) -> Result<Advance, RenderError> {
        pagination::step(
            surface,
            self.review_selector(),
            &self.pagination(),
            cursor,
            config,
        )
        .await
    }
}

/// Drop blocks rendered inside another matched block
///
/// Substring class selectors also match a card's own sub-components; only the
/// enclosing card is a review.
pub fn outermost(blocks: Vec<ElementSnapshot>) -> Vec<ElementSnapshot> {
    let nested: Vec<bool> = blocks
        .iter()
        .map(|block| {
            let inner = block.outer_html();
            blocks.iter().any(|other| {
                other.outer_html().len() > inner.len() && other.outer_html().contains(inner)
            })
        })
        .collect();

    blocks
        .into_iter()
        .zip(nested)
        .filter_map(|(block, nested)| (!nested).then_some(block))
        .collect()
}

fn field_or_generic(
    block: &Html,
    site: &[FieldSelector],
    generic: &[FieldSelector],
) -> Option<String> {
    first_match(block, site).or_else(|| first_match(block, generic))
}

/// Resolve the adapter for a platform
pub fn adapter_for(source: Source) -> Box<dyn SiteAdapter> {
    match source {
        Source::G2 => Box::new(G2Adapter),
        Source::Capterra => Box::new(CapterraAdapter),
        Source::TrustRadius => Box::new(TrustRadiusAdapter),
    }
}
