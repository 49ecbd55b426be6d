//! Line filter for converted page markdown.
//!
//! Some sites inline large JSON state blobs that the converter renders as
//! text. Those lines are dropped; everything else, blank lines included, is kept.

use std::sync::LazyLock;

use regex::Regex;

const PAYLOAD_MARKERS: &[&str] = &[
    "\"$type\":\"com.linkedin",
    "\"entityUrn\":\"urn:li:",
    "\"$recipeTypes\":",
    "\"lixTracking\":",
    "voyager.dash",
];

const LONG_LINE_CHARS: usize = 800;
const MAX_JSON_PAIRS: usize = 10;

static JSON_PAIR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""[^"]+":""#).expect("invalid pattern"));

/// Whether a markdown line should survive cleaning.
pub fn is_valid_markdown_line(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return true;
    }

    if PAYLOAD_MARKERS.iter().any(|marker| trimmed.contains(marker)) {
        return false;
    }

    let is_long_json =
        trimmed.chars().count() > LONG_LINE_CHARS && JSON_PAIR_RE.find_iter(trimmed).count() > MAX_JSON_PAIRS;
    !is_long_json
}

/// Drop invalid lines, keeping the rest in order.
pub fn clean_markdown(markdown: &str) -> String {
    markdown
        .split('\n')
        .filter(|line| is_valid_markdown_line(line))
        .collect::<Vec<_>>()
        .join("\n")
}
