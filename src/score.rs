use crate::models::{RawCell, Score};
use once_cell::sync::Lazy;
use regex::Regex;

/// Cell contents marking an examinee as absent for the subject.
static ABSENCE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)vắng|n/v").unwrap());

/// Leading decimal literal, the same prefix a lenient float reader accepts.
static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?").unwrap());

/// Normalize one raw cell into a score.
///
/// This is the only place that decides whether a score is usable; callers
/// test validity with [`Score::is_present`] on the result instead of
/// re-inspecting the raw text.
pub fn normalize_score(raw: &RawCell) -> Score {
    match raw {
        RawCell::Empty => Score::Missing,
        RawCell::Number(value) => finite(*value),
        RawCell::Text(text) => normalize_text(text),
    }
}

fn normalize_text(text: &str) -> Score {
    if text.is_empty() || ABSENCE_MARKER.is_match(text) {
        return Score::Missing;
    }

    // Only the first comma is a decimal separator
    let normalized = text.replacen(',', ".", 1);
    LEADING_NUMBER
        .find(normalized.trim_start())
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(finite)
        .unwrap_or(Score::Missing)
}

fn finite(value: f64) -> Score {
    if value.is_finite() {
        Score::Present(value)
    } else {
        Score::Missing
    }
}

/// Sum of every present subject score; missing subjects count as zero.
pub fn total_score(scores: &[Score]) -> f64 {
    scores.iter().filter_map(|score| score.value()).sum()
}
