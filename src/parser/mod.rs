//! Text-level review processing
//!
//! This module turns the raw text scraped from a review block into a
//! canonical record:
//!
//! - [`date`] - heuristic date parsing with a tagged unparseable outcome
//! - [`normalize`] - raw field sets to [`ReviewRecord`](crate::models::ReviewRecord)
//! - [`sanitize`] - whitespace and invisible character cleanup

pub mod date;
pub mod normalize;
pub mod sanitize;

pub use date::{DateParser, ParsedDate};
pub use normalize::{FieldKey, Normalized, RawField, RecordNormalizer};
