//! Text normalization applied to every free-text cell before classification.

use once_cell::sync::Lazy;
use regex::Regex;

static LINE_BREAK_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r\n|\r|\n").unwrap());

static CONTROL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{Cc}").unwrap());

/// Anything outside Thai script, ASCII letters/digits, whitespace, `-` and `.`
static DISALLOWED_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\x{0E00}-\x{0E7F}a-zA-Z0-9\s\-.]").unwrap());

static WHITESPACE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalize raw survey text. Returns an empty string when nothing survives.
pub fn normalize(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let mut cleaned = LINE_BREAK_PATTERN.replace_all(trimmed, " ").to_string();
    cleaned = CONTROL_PATTERN.replace_all(&cleaned, " ").to_string();
    cleaned = DISALLOWED_PATTERN.replace_all(&cleaned, " ").to_string();
    cleaned = WHITESPACE_PATTERN.replace_all(&cleaned, " ").to_string();

    cleaned.trim().to_string()
}

/// True when the text contains at least one Thai-script character
pub fn has_thai(text: &str) -> bool {
    text.chars().any(is_thai)
}

pub fn is_thai(c: char) -> bool {
    ('\u{0E00}'..='\u{0E7F}').contains(&c)
}
