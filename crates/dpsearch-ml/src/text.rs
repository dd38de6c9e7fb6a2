//! Text normalisation applied before embedding.

use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)]
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("Invalid non-word regex"));

#[allow(clippy::expect_used)]
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Lower-case `text`, drop punctuation and collapse whitespace.
///
/// ```rust
/// use dpsearch_ml::text::clean_string;
///
/// assert_eq!(clean_string("  Rates of  INFLATION, 2018! "), "rates of inflation 2018");
/// ```
pub fn clean_string(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, " ");
    WHITESPACE.replace_all(stripped.trim(), " ").into_owned()
}

/// Lower-cased whitespace tokens of `text`, punctuation kept.
pub fn lowercase_tokens(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}
