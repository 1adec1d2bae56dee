//! One pagination step with a bounded wait for new content
//!
//! Growth is detected by comparing a [`PageSignature`] taken before the
//! action with signatures polled afterwards. Appending modes look for more
//! review blocks; numbered pages look for a different first block.

use sha2::{Digest, Sha256};
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::adapter::{Advance, PageCursor};
use crate::config::ScraperConfig;
use crate::surface::RenderSurface;
use crate::utils::error::RenderError;

/// How a listing page exposes more reviews
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationMode {
    /// Scrolling to the bottom appends reviews
    InfiniteScroll,
    /// A button appends reviews; scroll is used when it is missing
    LoadMore { button: &'static str },
    /// A link replaces the document with the next page
    NextPage { link: &'static str },
}

impl PaginationMode {
    fn replaces_content(&self) -> bool {
        matches!(self, Self::NextPage { .. })
    }
}

/// Fingerprint of the review blocks currently rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSignature {
    pub count: usize,
    /// SHA-256 of the first block's markup
    pub first_digest: Option<String>,
}

impl PageSignature {
    pub async fn capture(
        surface: &mut dyn RenderSurface,
        review_selector: &str,
    ) -> Result<Self, RenderError> {
        let blocks = surface.query_all(review_selector).await?;
        Ok(Self {
            count: blocks.len(),
            first_digest: blocks.first().map(|block| digest(block.outer_html())),
        })
    }

    /// Check whether `self`, taken after an action, shows new content
    fn grew_from(&self, before: &Self, replaces: bool) -> bool {
        if replaces {
            self.count > 0 && self.first_digest != before.first_digest
        } else {
            self.count > before.count
        }
    }
}

fn digest(html: &str) -> String {
    format!("{:x}", Sha256::digest(html.as_bytes()))
}

/// Perform one pagination action and wait for its effect
///
/// Each attempt waits up to `render_timeout` for growth; after
/// `stall_attempts` attempts without growth the listing is reported
/// exhausted.
pub async fn step(
    surface: &mut dyn RenderSurface,
    review_selector: &str,
    mode: &PaginationMode,
    mut cursor: PageCursor,
    config: &ScraperConfig,
) -> Result<Advance, RenderError> {
    let before = PageSignature::capture(surface, review_selector).await?;
    let replaces = mode.replaces_content();

    if let PaginationMode::NextPage { link } = mode {
        match surface.click(link).await {
            Ok(()) => {}
            Err(RenderError::ElementNotFound(_)) => {
                debug!(page = cursor.page, "No next page link");
                return Ok(Advance::exhausted(cursor));
            }
            Err(e) => return Err(e),
        }
    }

    for attempt in 1..=config.stall_attempts {
        match mode {
            PaginationMode::InfiniteScroll => scroll(surface, &mut cursor).await?,
            PaginationMode::LoadMore { button } => match surface.click(button).await {
                Ok(()) => cursor.load_more_clicks += 1,
                Err(RenderError::Closed) => return Err(RenderError::Closed),
                Err(e) => {
                    debug!(error = %e, "Load more control unavailable, scrolling instead");
                    scroll(surface, &mut cursor).await?;
                }
            },
            // Clicked once above; later attempts only wait longer
            PaginationMode::NextPage { .. } => {}
        }

        if wait_for_growth(surface, review_selector, &before, replaces, config).await? {
            if replaces {
                cursor.page += 1;
                cursor.seen = 0;
            }
            return Ok(Advance::more(cursor));
        }

        debug!(
            attempt = attempt,
            stall_attempts = config.stall_attempts,
            "No new reviews after pagination attempt"
        );
    }

    Ok(Advance::exhausted(cursor))
}

async fn scroll(surface: &mut dyn RenderSurface, cursor: &mut PageCursor) -> Result<(), RenderError> {
    surface.scroll_to_bottom().await?;
    cursor.scrolls += 1;
    Ok(())
}

async fn wait_for_growth(
    surface: &mut dyn RenderSurface,
    review_selector: &str,
    before: &PageSignature,
    replaces: bool,
    config: &ScraperConfig,
) -> Result<bool, RenderError> {
    tokio::time::sleep(config.settle_delay()).await;
    let deadline = Instant::now() + config.render_timeout();

    loop {
        let current = PageSignature::capture(surface, review_selector).await?;
        if current.grew_from(before, replaces) {
            trace!(before = before.count, after = current.count, "Content grew");
            return Ok(true);
        }
        if Instant::now() >= deadline {
            return Ok(false);
        }
        tokio::time::sleep(config.poll_interval()).await;
    }
}
