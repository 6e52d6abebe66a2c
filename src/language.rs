use regex::Regex;
use std::sync::LazyLock;

/// Minimum share of ASCII letters among all letters for text to count as English.
const ENGLISH_THRESHOLD: f64 = 0.5;

/// A single letter (general category L*). Combining marks and letter
/// numbers are not letters.
#[allow(clippy::expect_used)]
static LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{L}").expect("letter pattern is valid"));

/// Share of letters that are ASCII letters.
/// Returns None when the text has no letters at all.
pub fn english_ratio(text: &str) -> Option<f64> {
    let (english, total) = LETTER
        .find_iter(text)
        .fold((0usize, 0usize), |(english, total), m| {
            (english + usize::from(m.as_str().is_ascii()), total + 1)
        });

    if total == 0 {
        return None;
    }
    Some(english as f64 / total as f64)
}

/// True when at least half of the letters in `text` are ASCII.
pub fn is_mostly_english(text: &str) -> bool {
    english_ratio(text).is_some_and(|ratio| ratio >= ENGLISH_THRESHOLD)
}
