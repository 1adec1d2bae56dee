//! Text sanitization utilities for cleaning extracted review content
//!
//! Review platforms render text with invisible formatting characters,
//! non-breaking spaces and deep indentation. These helpers reduce a block of
//! rendered text to a single clean line.

use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Sanitize extracted text content
///
/// This function applies multiple cleaning steps:
/// 1. Remove zero-width characters
/// 2. Remove control characters (newlines and tabs become spaces later)
/// 3. Replace non-breaking spaces
/// 4. Collapse whitespace runs and trim
///
/// Applying it twice gives the same result as applying it once.
///
/// # Examples
///
/// ```
/// use revharvest::parser::sanitize::sanitize_text;
///
/// let dirty = "  Great\u{200B} tool,\n\n   easy\u{a0}setup ";
/// assert_eq!(sanitize_text(dirty), "Great tool, easy setup");
/// ```
pub fn sanitize_text(text: &str) -> String {
    let mut result = remove_zero_width(text);
    result = remove_control_chars(&result);
    result = replace_special_spaces(&result);
    collapse_whitespace(&result)
}

/// Remove zero-width spaces and similar invisible characters
///
/// # Examples
///
/// ```
/// use revharvest::parser::sanitize::remove_zero_width;
///
/// let text = "a\u{200B}b\u{FEFF}c";
/// assert_eq!(remove_zero_width(text), "abc");
/// ```
pub fn remove_zero_width(text: &str) -> String {
    text.chars()
        .filter(|c| {
            !matches!(*c,
                '\u{200B}'..='\u{200F}' |
                '\u{202A}'..='\u{202E}' |
                '\u{2060}'..='\u{2064}' |
                '\u{FEFF}'
            )
        })
        .collect()
}

/// Turn no-break and separator spaces into plain spaces
///
/// ```
/// use revharvest::parser::sanitize::replace_special_spaces;
///
/// assert_eq!(replace_special_spaces("Jan\u{202F}5,\u{a0}2024"), "Jan 5, 2024");
/// ```
pub fn replace_special_spaces(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{a0}' | '\u{2028}' | '\u{2029}' | '\u{202F}' => ' ',
            other => other,
        })
        .collect()
}

/// Remove control characters except newline and tab
pub fn remove_control_chars(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// Collapse every whitespace run (including newlines) into one space and trim
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_REGEX.replace_all(text.trim(), " ").to_string()
}

/// Check if text contains meaningful content
///
/// # Examples
///
/// ```
/// use revharvest::parser::sanitize::has_content;
///
/// assert!(has_content("Hello"));
/// assert!(!has_content("   \n\t  "));
/// ```
pub fn has_content(text: &str) -> bool {
    !text.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_is_idempotent() {
        let dirty = "\u{FEFF}  Solid CRM\t\t for small\n\nteams\u{0007} ";
        let once = sanitize_text(dirty);
        assert_eq!(once, "Solid CRM for small teams");
        assert_eq!(sanitize_text(&once), once);
    }

    #[test]
    fn test_separator_spaces_keep_words_apart() {
        assert_eq!(sanitize_text("Jan\u{202F}5,\u{2028}2024"), "Jan 5, 2024");
        assert_eq!(sanitize_text("left\u{202E}right"), "leftright");
    }

    #[test]
    fn test_remove_control_chars_keeps_newline() {
        let clean = remove_control_chars("a\x00b\nc");
        assert_eq!(clean, "ab\nc");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  one \n two\t three  "), "one two three");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_nbsp_replaced() {
        assert_eq!(sanitize_text("5\u{a0}stars"), "5 stars");
    }
}
