//! Extract, filter and advance loop of a run

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::adapter::{PageCursor, SiteAdapter};
use crate::config::ScraperConfig;
use crate::models::{ResultSet, StopReason};
use crate::parser::date::ParsedDate;
use crate::parser::normalize::RecordNormalizer;
use crate::surface::RenderSurface;
use crate::utils::error::RenderError;

/// Drives an adapter over a loaded listing page until a stop condition
///
/// Listings are assumed newest first: once the oldest dated review of a batch
/// predates the window, later batches cannot contain in-window reviews.
pub struct PaginationDriver<'a> {
    config: &'a ScraperConfig,
    normalizer: &'a RecordNormalizer,
}

impl<'a> PaginationDriver<'a> {
    pub fn new(config: &'a ScraperConfig, normalizer: &'a RecordNormalizer) -> Self {
        Self { config, normalizer }
    }

    /// Run the loop, appending accepted records to `results`
    pub async fn run(
        &self,
        surface: &mut dyn RenderSurface,
        adapter: &dyn SiteAdapter,
        results: &mut ResultSet,
    ) -> Result<StopReason, RenderError> {
        let window = results.window;
        let source = adapter.source();
        let mut cursor = PageCursor::default();

        let reason = loop {
            results.stats_mut().steps += 1;

            let batch = adapter.extract_visible_reviews(surface, &cursor).await?;
            cursor.seen += batch.len();

            let mut oldest: Option<NaiveDate> = None;
            let mut kept = 0usize;

            for raw in &batch {
                let normalized = self.normalizer.normalize(raw, source);
                let stats = results.stats_mut();
                stats.blocks_seen += 1;
                stats.field_mismatches += normalized.missing.len();

                match normalized.date {
                    ParsedDate::Date(date) => {
                        oldest = Some(oldest.map_or(date, |o| o.min(date)));
                        if window.contains(date) {
                            results.push(normalized.record);
                            kept += 1;
                        } else {
                            stats.out_of_window += 1;
                        }
                    }
                    ParsedDate::Unparseable => {
                        stats.unparseable_dates += 1;
                        if self.config.keep_unparseable {
                            results.push(normalized.record);
                            kept += 1;
                        }
                    }
                }
            }

            debug!(
                step = results.stats().steps,
                batch = batch.len(),
                kept = kept,
                oldest = ?oldest,
                "Processed review batch"
            );

            if oldest.is_some_and(|date| window.predates(date)) {
                break StopReason::WindowExhausted;
            }

            if results.stats().steps >= self.config.max_steps {
                break StopReason::StepLimit;
            }

            let advance = adapter.advance(surface, cursor, self.config).await?;
            results.stats_mut().advances += 1;
            cursor = advance.cursor;

            if !advance.has_more {
                break StopReason::ContentExhausted;
            }
        };

        info!(
            source = %source,
            reason = %reason,
            steps = results.stats().steps,
            records = results.len(),
            "Pagination stopped"
        );
        results.stats_mut().stop_reason = Some(reason);
        Ok(reason)
    }
}
