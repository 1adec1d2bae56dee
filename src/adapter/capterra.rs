//! Capterra adapter
//!
//! Review cards are appended by a "load more" button. Some products only
//! serve reviews from the bare product page, which is tried second.

use url::Url;

use crate::adapter::{SiteAdapter, SiteSelectors};
use crate::engine::pagination::PaginationMode;
use crate::models::Source;

const BASE_URL: &str = "https://www.capterra.com/p/";

const LOAD_MORE: &str = "button[data-testid='load-more-reviews'], button.show-more-reviews";

#[derive(Debug, Clone, Copy, Default)]
pub struct CapterraAdapter;

impl SiteAdapter for CapterraAdapter {
    fn source(&self) -> Source {
        Source::Capterra
    }

    fn build_listing_url(&self, company_slug: &str) -> Result<Url, url::ParseError> {
        Url::parse(BASE_URL)?.join(&format!("{company_slug}/reviews/"))
    }

    fn alternate_listing_urls(&self, company_slug: &str) -> Vec<Url> {
        Url::parse(BASE_URL)
            .and_then(|base| base.join(&format!("{company_slug}/")))
            .into_iter()
            .collect()
    }

    fn selectors(&self) -> &'static SiteSelectors {
        SiteSelectors::capterra()
    }

    fn pagination(&self) -> PaginationMode {
        PaginationMode::LoadMore { button: LOAD_MORE }
    }

    fn date_formats(&self) -> &'static [&'static str] {
        &["%b %d, %Y"]
    }
}
