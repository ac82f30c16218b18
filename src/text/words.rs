use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::script::is_script_char;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Approximate Hebrew word count.
///
/// Markup tags are dropped, then every char outside the Hebrew block that is
/// not whitespace becomes a separator. Numerals, punctuation and Latin text
/// therefore never count, and hyphenated or punctuated compounds split.
pub fn count_words(text: &str) -> usize {
    let stripped = TAG_RE.replace_all(text, "");
    let cleaned: String = stripped
        .chars()
        .map(|c| {
            if is_script_char(c) || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    cleaned.split_whitespace().count()
}

/// Word count of a JSON text block; non-strings count zero.
pub fn count_value_words(value: &Value) -> usize {
    value.as_str().map(count_words).unwrap_or(0)
}
