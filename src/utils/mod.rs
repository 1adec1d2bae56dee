//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application.

pub mod error;
pub mod retry;

use regex::Regex;
use std::sync::OnceLock;

/// Sanitize filename by removing invalid characters
pub fn sanitize_filename(filename: &str) -> String {
    static INVALID_CHARS: OnceLock<Regex> = OnceLock::new();

    let re = INVALID_CHARS
        .get_or_init(|| Regex::new(r#"[<>:"/\\|?*\s]"#).expect("Invalid regex pattern"));

    re.replace_all(filename, "_").to_string()
}
