//! Configuration management for revharvest
//!
//! This module handles loading and validating configuration from environment variables,
//! files, and command-line arguments.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Extraction run configuration
    pub scraper: ScraperConfig,

    /// Browser launch configuration
    pub browser: BrowserConfig,

    /// Output configuration
    pub output: OutputConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Extraction run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Ceiling on extraction steps per run
    pub max_steps: u32,

    /// Growth probes per pagination step before the page counts as exhausted
    pub stall_attempts: u32,

    /// Bound on a single growth probe or selector wait, in milliseconds
    pub render_timeout_ms: u64,

    /// Delay between polls while waiting for new content, in milliseconds
    pub poll_interval_ms: u64,

    /// Pause after every pagination action, in milliseconds
    pub settle_ms: u64,

    /// Page load timeout in seconds
    pub navigation_timeout_secs: u64,

    /// Navigation retries after the first attempt
    pub navigation_retries: u32,

    /// Base delay for navigation retry backoff
    pub retry_base_delay_ms: u64,

    /// Cap for navigation retry backoff
    pub retry_max_delay_ms: u64,

    /// Keep reviews whose date could not be parsed
    pub keep_unparseable: bool,
}

/// Browser launch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run without a visible window
    pub headless: bool,

    /// Enable the Chrome sandbox
    pub sandbox: bool,

    /// User agent override
    pub user_agent: Option<String>,

    pub window_width: u32,
    pub window_height: u32,
}

/// How records with an unparseable date are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnparsedDate {
    /// Write the scraped date text as-is
    #[default]
    Raw,
    /// Write `null`
    Null,
}

impl UnparsedDate {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "raw" => Some(Self::Raw),
            "null" | "none" => Some(Self::Null),
            _ => None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving the JSON files
    pub dir: PathBuf,

    /// Pretty-print JSON
    pub pretty: bool,

    /// Date representation for unparseable dates
    pub unparsed_date: UnparsedDate,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse::<T>().ok())
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or malformed variables fall back to the defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let scraper = &defaults.scraper;
        let browser = &defaults.browser;

        Ok(Self {
            scraper: ScraperConfig {
                max_steps: env_parse("REVHARVEST_MAX_STEPS").unwrap_or(scraper.max_steps),
                stall_attempts: env_parse("REVHARVEST_STALL_ATTEMPTS")
                    .unwrap_or(scraper.stall_attempts),
                render_timeout_ms: env_parse("REVHARVEST_RENDER_TIMEOUT_MS")
                    .unwrap_or(scraper.render_timeout_ms),
                poll_interval_ms: env_parse("REVHARVEST_POLL_INTERVAL_MS")
                    .unwrap_or(scraper.poll_interval_ms),
                settle_ms: env_parse("REVHARVEST_SETTLE_MS").unwrap_or(scraper.settle_ms),
                navigation_timeout_secs: env_parse("REVHARVEST_NAVIGATION_TIMEOUT")
                    .unwrap_or(scraper.navigation_timeout_secs),
                navigation_retries: env_parse("REVHARVEST_NAVIGATION_RETRIES")
                    .unwrap_or(scraper.navigation_retries),
                retry_base_delay_ms: env_parse("REVHARVEST_RETRY_BASE_DELAY_MS")
                    .unwrap_or(scraper.retry_base_delay_ms),
                retry_max_delay_ms: env_parse("REVHARVEST_RETRY_MAX_DELAY_MS")
                    .unwrap_or(scraper.retry_max_delay_ms),
                keep_unparseable: env_parse("REVHARVEST_KEEP_UNPARSEABLE")
                    .unwrap_or(scraper.keep_unparseable),
            },
            browser: BrowserConfig {
                headless: env_parse("REVHARVEST_HEADLESS").unwrap_or(browser.headless),
                sandbox: env_parse("REVHARVEST_SANDBOX").unwrap_or(browser.sandbox),
                user_agent: std::env::var("REVHARVEST_USER_AGENT")
                    .ok()
                    .or_else(|| browser.user_agent.clone()),
                window_width: browser.window_width,
                window_height: browser.window_height,
            },
            output: OutputConfig {
                dir: std::env::var("REVHARVEST_OUTPUT_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| defaults.output.dir.clone()),
                pretty: env_parse("REVHARVEST_PRETTY").unwrap_or(defaults.output.pretty),
                unparsed_date: std::env::var("REVHARVEST_UNPARSED_DATE")
                    .ok()
                    .and_then(|v| UnparsedDate::parse(&v))
                    .unwrap_or_default(),
            },
            logging: LoggingConfig {
                level: std::env::var("REVHARVEST_LOG_LEVEL")
                    .unwrap_or_else(|_| String::from("info")),
                format: std::env::var("REVHARVEST_LOG_FORMAT")
                    .unwrap_or_else(|_| String::from("text")),
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let scraper = &self.scraper;

        if scraper.max_steps == 0 {
            anyhow::bail!("max_steps must be greater than 0");
        }

        if scraper.stall_attempts == 0 {
            anyhow::bail!("stall_attempts must be greater than 0");
        }

        if scraper.poll_interval_ms == 0 {
            anyhow::bail!("poll_interval_ms must be greater than 0");
        }

        if scraper.render_timeout_ms < scraper.poll_interval_ms {
            anyhow::bail!("render_timeout_ms must not be shorter than poll_interval_ms");
        }

        if scraper.retry_base_delay_ms > scraper.retry_max_delay_ms {
            anyhow::bail!("retry_base_delay_ms must not exceed retry_max_delay_ms");
        }

        if self.browser.window_width == 0 || self.browser.window_height == 0 {
            anyhow::bail!("browser window size must be non-zero");
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!("logging format must be 'text' or 'json'");
        }

        Ok(())
    }
}

impl ScraperConfig {
    #[must_use]
    pub fn render_timeout(&self) -> Duration {
        Duration::from_millis(self.render_timeout_ms)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    #[must_use]
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            max_steps: 40,
            stall_attempts: 3,
            render_timeout_ms: 8000,
            poll_interval_ms: 250,
            settle_ms: 800,
            navigation_timeout_secs: 30,
            navigation_retries: 3,
            retry_base_delay_ms: 1000,
            retry_max_delay_ms: 30_000,
            keep_unparseable: true,
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: false,
            user_agent: Some(format!("revharvest/{}", env!("CARGO_PKG_VERSION"))),
            window_width: 1366,
            window_height: 900,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            pretty: true,
            unparsed_date: UnparsedDate::Raw,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}
