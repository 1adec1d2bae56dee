//! JSON output for result sets
//!
//! Each run is written to `{company}_{source}_{start}_to_{end}.json` as an
//! array of objects with exactly the keys `title`, `description`, `date`,
//! `rating`, `reviewer` and `source`. Files are written to a temporary path
//! and renamed into place.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::{OutputConfig, UnparsedDate};
use crate::models::{Rating, ResultSet, ReviewRecord, Source};
use crate::utils::sanitize_filename;

/// Serialized form of one review
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRecord {
    pub title: String,
    pub description: String,
    pub date: Option<String>,
    pub rating: Option<Rating>,
    pub reviewer: Option<String>,
    pub source: Source,
}

impl OutputRecord {
    pub fn from_record(record: &ReviewRecord, unparsed: UnparsedDate) -> Self {
        let date = match (record.date, unparsed) {
            (Some(date), _) => Some(date.format("%Y-%m-%d").to_string()),
            (None, UnparsedDate::Raw) => record.raw_date.clone(),
            (None, UnparsedDate::Null) => None,
        };

        Self {
            title: record.title.clone(),
            description: record.description.clone(),
            date,
            rating: record.rating.clone(),
            reviewer: record.reviewer.clone(),
            source: record.source,
        }
    }
}

/// Writes result sets as JSON files into an output directory
#[derive(Debug, Clone)]
pub struct ReviewWriter {
    output_dir: PathBuf,
    pretty: bool,
    unparsed: UnparsedDate,
}

impl ReviewWriter {
    /// Create a writer, creating the output directory if needed
    pub fn new(config: &OutputConfig) -> Result<Self> {
        fs::create_dir_all(&config.dir).with_context(|| {
            format!("Failed to create output directory: {}", config.dir.display())
        })?;

        Ok(Self {
            output_dir: config.dir.clone(),
            pretty: config.pretty,
            unparsed: config.unparsed_date,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// File name for a result set
    ///
    /// Format: {company}_{source}_{YYYYMMDD}_to_{YYYYMMDD}.json
    pub fn file_name(results: &ResultSet) -> String {
        format!(
            "{}_{}_{}_to_{}.json",
            sanitize_filename(&results.company),
            results.source,
            results.window.start().format("%Y%m%d"),
            results.window.end().format("%Y%m%d")
        )
    }

    /// Records in output form, in result set order
    pub fn render(&self, results: &ResultSet) -> Vec<OutputRecord> {
        results
            .records()
            .iter()
            .map(|record| OutputRecord::from_record(record, self.unparsed))
            .collect()
    }

    /// Write a result set and return the file path
    pub fn save(&self, results: &ResultSet) -> Result<PathBuf> {
        let filename = Self::file_name(results);
        let filepath = self.output_dir.join(&filename);

        // Write to temp file first, then rename (atomic)
        let temp_path = self.output_dir.join(format!("{filename}.tmp"));

        let file = File::create(&temp_path)
            .with_context(|| format!("Failed to create file: {}", temp_path.display()))?;
        let mut writer = BufWriter::new(file);

        let records = self.render(results);
        if self.pretty {
            serde_json::to_writer_pretty(&mut writer, &records)
        } else {
            serde_json::to_writer(&mut writer, &records)
        }
        .context("Failed to serialize reviews")?;

        writer
            .flush()
            .with_context(|| format!("Failed to write to file: {}", temp_path.display()))?;

        fs::rename(&temp_path, &filepath)
            .with_context(|| format!("Failed to rename output file: {}", filepath.display()))?;

        tracing::debug!(path = %filepath.display(), records = records.len(), "Saved reviews");
        Ok(filepath)
    }
}
