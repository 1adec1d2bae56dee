// Core data structures for revharvest

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::utils::error::ScrapeError;

/// Review platform enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    G2,
    Capterra,
    TrustRadius,
}

impl Source {
    /// Get the lowercase tag used in output and file names
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::G2 => "g2",
            Self::Capterra => "capterra",
            Self::TrustRadius => "trustradius",
        }
    }

    /// Get the platform's display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::G2 => "G2",
            Self::Capterra => "Capterra",
            Self::TrustRadius => "TrustRadius",
        }
    }

    /// Create from string (case-insensitive, accepts common spellings)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "g2" | "g2crowd" | "g2 crowd" => Some(Self::G2),
            "capterra" => Some(Self::Capterra),
            "trustradius" | "trust radius" | "trust-radius" => Some(Self::TrustRadius),
            _ => None,
        }
    }

    /// Get all sources
    pub fn all() -> Vec<Self> {
        vec![Self::G2, Self::Capterra, Self::TrustRadius]
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inclusive calendar-day window a run is restricted to
///
/// Fields are private so `start <= end` holds for every value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Create a window, rejecting `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ScrapeError> {
        if start > end {
            return Err(ScrapeError::invalid_input(format!(
                "start date {start} is after end date {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse both bounds from `YYYY-MM-DD` strings
    pub fn parse(start: &str, end: &str) -> Result<Self, ScrapeError> {
        let parse = |label: &str, value: &str| {
            NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
                ScrapeError::invalid_input(format!(
                    "invalid {label} date '{value}': {e} (expected YYYY-MM-DD)"
                ))
            })
        };
        Self::new(parse("start", start)?, parse("end", end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Check if a date falls inside the window (both bounds inclusive)
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Check if a date is older than the window start
    pub fn predates(&self, date: NaiveDate) -> bool {
        date < self.start
    }
}

impl std::fmt::Display for DateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Review rating: numeric when the platform exposes a score, text otherwise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rating {
    Score(f64),
    Text(String),
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Score(v) => write!(f, "{v}"),
            Self::Text(t) => write!(f, "{t}"),
        }
    }
}

/// Canonical review record
///
/// `date` is `None` when the scraped text could not be parsed; that raw text
/// is kept in `raw_date` so the output writer can still emit it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRecord {
    pub title: String,
    pub description: String,
    pub date: Option<NaiveDate>,
    pub raw_date: Option<String>,
    pub rating: Option<Rating>,
    pub reviewer: Option<String>,
    pub source: Source,
}

impl ReviewRecord {
    /// Check if the record carries a parsed date
    pub fn has_date(&self) -> bool {
        self.date.is_some()
    }
}

/// Why a run stopped paginating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The oldest review of a batch predates the window start
    WindowExhausted,
    /// The page stopped producing new reviews
    ContentExhausted,
    /// The configured step ceiling was reached
    StepLimit,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::WindowExhausted => "window exhausted",
            Self::ContentExhausted => "content exhausted",
            Self::StepLimit => "step limit",
        };
        write!(f, "{label}")
    }
}

/// Counters collected during one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Extraction iterations performed
    pub steps: u32,
    /// Pagination steps requested from the adapter
    pub advances: u32,
    /// Review blocks read from the page
    pub blocks_seen: usize,
    /// Records whose date could not be parsed
    pub unparseable_dates: usize,
    /// Records dropped because their date fell outside the window
    pub out_of_window: usize,
    /// Expected fields missing from review blocks
    pub field_mismatches: usize,
    /// Stop condition that ended the run
    pub stop_reason: Option<StopReason>,
}

/// Ordered records produced by one run
#[derive(Debug, Clone)]
pub struct ResultSet {
    pub source: Source,
    pub company: String,
    pub window: DateWindow,
    records: Vec<ReviewRecord>,
    stats: RunStats,
}

impl ResultSet {
    /// Create an empty result set for a run
    pub fn new(source: Source, company: impl Into<String>, window: DateWindow) -> Self {
        Self {
            source,
            company: company.into(),
            window,
            records: Vec::new(),
            stats: RunStats::default(),
        }
    }

    /// Append a record, preserving page-visit order
    pub fn push(&mut self, record: ReviewRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[ReviewRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ReviewRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records (kept or dropped) whose date was unparseable
    pub fn unparseable_count(&self) -> usize {
        self.stats.unparseable_dates
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut RunStats {
        &mut self.stats
    }
}
