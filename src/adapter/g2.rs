//! G2 adapter
//!
//! Reviews are marked up with schema.org microdata and split across
//! numbered pages linked with `rel="next"`.

use scraper::Html;
use url::Url;

use crate::adapter::{SiteAdapter, SiteSelectors};
use crate::engine::pagination::PaginationMode;
use crate::models::Source;
use crate::parser::date::DateParser;

const BASE_URL: &str = "https://www.g2.com/products/";

/// Characters of the review body searched for a date when the date field is missing
const BODY_DATE_PREFIX: usize = 50;

const NEXT_PAGE: &str = "a[rel='next'], a.pagination__named-link[aria-label='Next']";

#[derive(Debug, Clone, Copy, Default)]
pub struct G2Adapter;

impl SiteAdapter for G2Adapter {
    fn source(&self) -> Source {
        Source::G2
    }

    fn build_listing_url(&self, company_slug: &str) -> Result<Url, url::ParseError> {
        Url::parse(BASE_URL)?.join(&format!("{company_slug}/reviews"))
    }

    fn selectors(&self) -> &'static SiteSelectors {
        SiteSelectors::g2()
    }

    fn pagination(&self) -> PaginationMode {
        PaginationMode::NextPage { link: NEXT_PAGE }
    }

    fn date_formats(&self) -> &'static [&'static str] {
        &["%m/%d/%Y"]
    }

    /// Older review layouts print the date at the start of the body
    fn date_field(&self, block: &Html) -> Option<String> {
        super::field_or_generic(block, self.selectors().date, SiteSelectors::generic().date)
            .or_else(|| {
                let body = self.description_field(block)?;
                let head: String = body.trim_start().chars().take(BODY_DATE_PREFIX).collect();
                DateParser::has_date_token(&head).then_some(head)
            })
    }

    /// Titles are rendered inside typographic quotes
    fn title_field(&self, block: &Html) -> Option<String> {
        super::field_or_generic(block, self.selectors().title, SiteSelectors::generic().title)
            .map(|title| strip_quotes(&title))
            .filter(|title| !title.is_empty())
    }
}

fn strip_quotes(text: &str) -> String {
    text.trim()
        .trim_matches(|c| matches!(c, '"' | '\u{201c}' | '\u{201d}'))
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::normalize::FieldKey;
    use crate::surface::ElementSnapshot;

    #[test]
    fn test_listing_url() {
        let url = G2Adapter.build_listing_url("acme-crm").unwrap();
        assert_eq!(url.as_str(), "https://www.g2.com/products/acme-crm/reviews");
    }

    #[test]
    fn test_parse_microdata_block() {
        let block = ElementSnapshot::new(
            r#"<div itemprop="review">
                <h3 itemprop="name">“Best CRM we tried”</h3>
                <div itemprop="author"><meta itemprop="name" content="Dana K."></div>
                <meta itemprop="datePublished" content="2024-01-15">
                <div itemprop="reviewRating"><meta itemprop="ratingValue" content="4.5"></div>
                <div itemprop="reviewBody"><p>Pipelines are easy.</p><p>Reports are slow.</p></div>
            </div>"#,
        );
        let raw = G2Adapter.parse_block(&block);
        assert_eq!(raw.get(FieldKey::Title), Some("Best CRM we tried"));
        assert_eq!(raw.get(FieldKey::Date), Some("2024-01-15"));
        assert_eq!(raw.get(FieldKey::Rating), Some("4.5"));
        assert_eq!(raw.get(FieldKey::Reviewer), Some("Dana K."));
        assert!(raw
            .get(FieldKey::Description)
            .is_some_and(|d| d.contains("Pipelines are easy.") && d.contains("Reports are slow.")));
    }

    #[test]
    fn test_date_from_body_when_field_missing() {
        let block = ElementSnapshot::new(
            r#"<div itemprop="review">
                <h3 itemprop="name">Fine</h3>
                <div itemprop="reviewBody">Jan 05, 2024 - Works for our team.</div>
            </div>"#,
        );
        let raw = G2Adapter.parse_block(&block);
        assert!(raw
            .get(FieldKey::Date)
            .is_some_and(|d| d.starts_with("Jan 05, 2024")));

        let undated = ElementSnapshot::new(
            r#"<div itemprop="review"><div itemprop="reviewBody">No date here.</div></div>"#,
        );
        assert_eq!(G2Adapter.parse_block(&undated).get(FieldKey::Date), None);
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("\u{201c}Solid\u{201d}"), "Solid");
        assert_eq!(strip_quotes("\"Plain\""), "Plain");
        assert_eq!(strip_quotes("No quotes"), "No quotes");
    }
}
