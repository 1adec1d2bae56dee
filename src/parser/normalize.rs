//! Mapping of raw scraped fields into canonical review records

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::models::{Rating, ReviewRecord, Source};
use crate::parser::date::{DateParser, ParsedDate};
use crate::parser::sanitize::sanitize_text;

static NUMBER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+(?:\.\d+)?$").unwrap());

static OUT_OF_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:out of|/)\s*\d+(?:\.\d+)?").unwrap()
});

static STARS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:rated\s+)?(\d+(?:\.\d+)?)\s*(?:stars?|★)$").unwrap()
});

/// Fields a review block is expected to provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldKey {
    Title,
    Description,
    Date,
    Rating,
    Reviewer,
}

impl FieldKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Date => "date",
            Self::Rating => "rating",
            Self::Reviewer => "reviewer",
        }
    }

    pub fn all() -> [Self; 5] {
        [
            Self::Title,
            Self::Description,
            Self::Date,
            Self::Rating,
            Self::Reviewer,
        ]
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Key to text mapping scraped from one review block
///
/// Lives only for one extraction step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawField {
    fields: BTreeMap<FieldKey, String>,
}

impl RawField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, ignoring absent values
    pub fn set(&mut self, key: FieldKey, value: Option<String>) {
        if let Some(value) = value {
            self.fields.insert(key, value);
        }
    }

    /// Builder-style setter
    #[must_use]
    pub fn with(mut self, key: FieldKey, value: impl Into<String>) -> Self {
        self.fields.insert(key, value.into());
        self
    }

    pub fn get(&self, key: FieldKey) -> Option<&str> {
        self.fields.get(&key).map(String::as_str)
    }

    /// Fields that are absent or blank
    pub fn missing(&self) -> Vec<FieldKey> {
        FieldKey::all()
            .into_iter()
            .filter(|key| self.get(*key).map_or(true, |v| v.trim().is_empty()))
            .collect()
    }
}

impl From<&ReviewRecord> for RawField {
    fn from(record: &ReviewRecord) -> Self {
        let mut raw = RawField::new()
            .with(FieldKey::Title, record.title.clone())
            .with(FieldKey::Description, record.description.clone());

        let date = match (record.date, &record.raw_date) {
            (Some(date), _) => Some(date.format("%Y-%m-%d").to_string()),
            (None, raw_date) => raw_date.clone(),
        };
        raw.set(FieldKey::Date, date);
        raw.set(FieldKey::Rating, record.rating.as_ref().map(Rating::to_string));
        raw.set(FieldKey::Reviewer, record.reviewer.clone());
        raw
    }
}

/// A normalized record together with what was learned while building it
#[derive(Debug, Clone)]
pub struct Normalized {
    pub record: ReviewRecord,
    pub date: ParsedDate,
    pub missing: Vec<FieldKey>,
}

/// Converts raw field sets into [`ReviewRecord`]s
///
/// Pure: the only state is the date parser and its fixed reference time.
#[derive(Debug, Clone)]
pub struct RecordNormalizer {
    dates: DateParser,
}

impl RecordNormalizer {
    pub fn new(dates: DateParser) -> Self {
        Self { dates }
    }

    pub fn date_parser(&self) -> &DateParser {
        &self.dates
    }

    /// Build the canonical record for one review block
    ///
    /// Text is sanitized, missing optional fields become `None`, and the
    /// source tag is always set.
    pub fn normalize(&self, raw: &RawField, source: Source) -> Normalized {
        let text = |key| raw.get(key).map(sanitize_text).filter(|v| !v.is_empty());

        let raw_date = text(FieldKey::Date);
        let date = raw_date
            .as_deref()
            .map_or(ParsedDate::Unparseable, |d| self.dates.parse(d));

        let record = ReviewRecord {
            title: text(FieldKey::Title).unwrap_or_default(),
            description: text(FieldKey::Description).unwrap_or_default(),
            date: date.date(),
            raw_date: if date.is_unparseable() { raw_date } else { None },
            rating: text(FieldKey::Rating).map(|r| parse_rating(&r)),
            reviewer: text(FieldKey::Reviewer),
            source,
        };

        Normalized {
            record,
            date,
            missing: raw.missing(),
        }
    }
}

/// Turn rating text into a score when it contains one
///
/// ```
/// use revharvest::models::Rating;
/// use revharvest::parser::normalize::parse_rating;
///
/// assert_eq!(parse_rating("4.5 out of 5"), Rating::Score(4.5));
/// assert_eq!(parse_rating("Rated 4 stars"), Rating::Score(4.0));
/// assert_eq!(parse_rating("Excellent"), Rating::Text("Excellent".into()));
/// ```
pub fn parse_rating(text: &str) -> Rating {
    let clean = sanitize_text(text);

    let score = if NUMBER_REGEX.is_match(&clean) {
        clean.parse::<f64>().ok()
    } else {
        OUT_OF_REGEX
            .captures(&clean)
            .or_else(|| STARS_REGEX.captures(&clean))
            .and_then(|caps| caps[1].parse::<f64>().ok())
    };

    match score {
        Some(value) if value.is_finite() => Rating::Score(value),
        _ => Rating::Text(clean),
    }
}
