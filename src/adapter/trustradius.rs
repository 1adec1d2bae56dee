//! TrustRadius adapter
//!
//! The listing grows by infinite scroll. Scores are out of 10.

use url::Url;

use crate::adapter::{SiteAdapter, SiteSelectors};
use crate::engine::pagination::PaginationMode;
use crate::models::Source;

const BASE_URL: &str = "https://www.trustradius.com/products/";

#[derive(Debug, Clone, Copy, Default)]
pub struct TrustRadiusAdapter;

impl SiteAdapter for TrustRadiusAdapter {
    fn source(&self) -> Source {
        Source::TrustRadius
    }

    fn build_listing_url(&self, company_slug: &str) -> Result<Url, url::ParseError> {
        Url::parse(BASE_URL)?.join(&format!("{company_slug}/reviews"))
    }

    fn selectors(&self) -> &'static SiteSelectors {
        SiteSelectors::trustradius()
    }

    fn pagination(&self) -> PaginationMode {
        PaginationMode::InfiniteScroll
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::normalize::FieldKey;
    use crate::surface::ElementSnapshot;

    #[test]
    fn test_listing_url() {
        let url = TrustRadiusAdapter.build_listing_url("acme-crm").unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.trustradius.com/products/acme-crm/reviews"
        );
    }

    #[test]
    fn test_parse_review_article() {
        let block = ElementSnapshot::new(
            r#"<article class="review">
                <h4 class="review-title">Great for mid-size teams</h4>
                <span class="reviewer-name">Alex R.</span>
                <time datetime="2024-01-20">January 20, 2024</time>
                <span class="trust-score" aria-label="Rated 9 out of 10"></span>
                <div class="review-content">Automation rules save hours.</div>
            </article>"#,
        );
        let raw = TrustRadiusAdapter.parse_block(&block);
        assert_eq!(raw.get(FieldKey::Title), Some("Great for mid-size teams"));
        assert_eq!(raw.get(FieldKey::Reviewer), Some("Alex R."));
        assert_eq!(raw.get(FieldKey::Date), Some("2024-01-20"));
        assert_eq!(raw.get(FieldKey::Rating), Some("Rated 9 out of 10"));
        assert_eq!(
            raw.get(FieldKey::Description),
            Some("Automation rules save hours.")
        );
    }
}
