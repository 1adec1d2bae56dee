//! Heuristic review date parsing
//!
//! Review platforms print dates in many shapes: ISO timestamps in `datetime`
//! attributes, `"January 5, 2024"`, `"01/05/2024"`, or relative phrases like
//! `"3 days ago"`. [`DateParser`] turns any of these into a calendar day, and
//! reports [`ParsedDate::Unparseable`] instead of failing when nothing matches.
//!
//! Relative phrases are resolved against a fixed reference instant (the run
//! start), so parsing is deterministic.

use chrono::{DateTime, Days, Months, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use regex::Regex;
use std::sync::LazyLock;

use crate::parser::sanitize::sanitize_text;

/// Formats tried against the whole (cleaned) text, in order
const GENERIC_FORMATS: &[&str] = &[
    "%Y-%m-%d",   // 2024-01-15
    "%B %d, %Y",  // January 15, 2024 / Jan 15, 2024
    "%B %d %Y",   // January 15 2024
    "%d %B %Y",   // 15 January 2024
    "%d %B, %Y",  // 15 January, 2024
    "%m/%d/%Y",   // 01/15/2024
    "%Y/%m/%d",   // 2024/01/15
    "%Y.%m.%d",   // 2024.01.15
    "%Y.%m.%d.",  // 2024.01.15.
];

/// Timestamp formats whose date part is kept
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

static RELATIVE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d+|a|an|one)\s+(second|minute|hour|day|week|month|year)s?\s+ago\b").unwrap()
});

static ISO_TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})").unwrap());

static MONTH_FIRST_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b",
    )
    .unwrap()
});

static DAY_FIRST_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?\s+(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?,?\s+(\d{4})\b",
    )
    .unwrap()
});

static SLASH_TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").unwrap());

/// Outcome of parsing a date string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDate {
    /// A recognized calendar day
    Date(NaiveDate),
    /// No known format matched
    Unparseable,
}

impl ParsedDate {
    /// Get the parsed day, if any
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            Self::Unparseable => None,
        }
    }

    pub fn is_unparseable(&self) -> bool {
        matches!(self, Self::Unparseable)
    }
}

/// Free-text date parser with adapter-specific format overrides
#[derive(Debug, Clone)]
pub struct DateParser {
    reference: DateTime<Utc>,
    extra_formats: Vec<&'static str>,
}

impl DateParser {
    /// Create a parser resolving relative phrases against `reference`
    pub fn new(reference: DateTime<Utc>) -> Self {
        Self {
            reference,
            extra_formats: Vec::new(),
        }
    }

    /// Add platform-specific formats tried before the generic ones
    #[must_use]
    pub fn with_formats(mut self, formats: &[&'static str]) -> Self {
        self.extra_formats.extend_from_slice(formats);
        self
    }

    /// Reference instant used for relative phrases
    pub fn reference(&self) -> DateTime<Utc> {
        self.reference
    }

    /// Parse free text into a calendar day
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{NaiveDate, TimeZone, Utc};
    /// use revharvest::parser::date::{DateParser, ParsedDate};
    ///
    /// let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
    /// let parser = DateParser::new(now);
    ///
    /// let day = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
    /// assert_eq!(parser.parse("3 days ago"), ParsedDate::Date(day));
    /// assert_eq!(parser.parse("Great product"), ParsedDate::Unparseable);
    /// ```
    pub fn parse(&self, text: &str) -> ParsedDate {
        let clean = sanitize_text(text);
        if clean.is_empty() {
            return ParsedDate::Unparseable;
        }

        self.parse_exact(&clean)
            .or_else(|| self.parse_relative(&clean.to_lowercase()))
            .or_else(|| Self::parse_embedded(&clean))
            .map_or(ParsedDate::Unparseable, ParsedDate::Date)
    }

    /// Check whether text contains an absolute date token
    ///
    /// Relative phrases are ignored since they need a reference time.
    pub fn has_date_token(text: &str) -> bool {
        Self::parse_embedded(&sanitize_text(text)).is_some()
    }

    /// Try the whole text against known formats
    fn parse_exact(&self, clean: &str) -> Option<NaiveDate> {
        for format in self.extra_formats.iter().chain(GENERIC_FORMATS) {
            if let Ok(date) = NaiveDate::parse_from_str(clean, format) {
                return Some(date);
            }
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(clean) {
            return Some(dt.date_naive());
        }

        for format in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(clean, format) {
                return Some(dt.date());
            }
        }

        None
    }

    /// Resolve "yesterday", "3 days ago", "a month ago", ...
    fn parse_relative(&self, lower: &str) -> Option<NaiveDate> {
        let today = self.reference.date_naive();

        if lower == "today" || lower == "just now" || lower.ends_with("moments ago") {
            return Some(today);
        }
        if lower == "yesterday" {
            return today.checked_sub_days(Days::new(1));
        }

        let caps = RELATIVE_REGEX.captures(lower)?;
        let amount: u32 = match &caps[1] {
            "a" | "an" | "one" => 1,
            digits => digits.parse().ok()?,
        };

        match &caps[2] {
            "second" => self.minus_seconds(i64::from(amount)),
            "minute" => self.minus_seconds(i64::from(amount) * 60),
            "hour" => self.minus_seconds(i64::from(amount) * 3600),
            "day" => today.checked_sub_days(Days::new(u64::from(amount))),
            "week" => today.checked_sub_days(Days::new(u64::from(amount) * 7)),
            "month" => today.checked_sub_months(Months::new(amount)),
            "year" => today.checked_sub_months(Months::new(amount.checked_mul(12)?)),
            _ => None,
        }
    }

    fn minus_seconds(&self, seconds: i64) -> Option<NaiveDate> {
        let delta = TimeDelta::try_seconds(seconds)?;
        self.reference
            .checked_sub_signed(delta)
            .map(|dt| dt.date_naive())
    }

    /// Find a date token inside longer text ("Reviewed on Jan 5, 2024")
    fn parse_embedded(clean: &str) -> Option<NaiveDate> {
        if let Some(caps) = ISO_TOKEN_REGEX.captures(clean) {
            if let Some(date) = ymd(&caps[1], &caps[2], &caps[3]) {
                return Some(date);
            }
        }

        if let Some(caps) = MONTH_FIRST_REGEX.captures(clean) {
            let month = month_from_name(&caps[1])?;
            return NaiveDate::from_ymd_opt(caps[3].parse().ok()?, month, caps[2].parse().ok()?);
        }

        if let Some(caps) = DAY_FIRST_REGEX.captures(clean) {
            let month = month_from_name(&caps[2])?;
            return NaiveDate::from_ymd_opt(caps[3].parse().ok()?, month, caps[1].parse().ok()?);
        }

        if let Some(caps) = SLASH_TOKEN_REGEX.captures(clean) {
            return ymd(&caps[3], &caps[1], &caps[2]);
        }

        None
    }
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn month_from_name(name: &str) -> Option<u32> {
    let month = match name.get(..3)?.to_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}
