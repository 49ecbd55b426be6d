//! Captured page entries and session state.
//!
//! `normalize_cache_entries` is the parsing step applied wherever entries
//! cross a load boundary: anything that does not have the entry shape, or
//! carries an oversized body, is dropped without failing the load.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum markdown body accepted for a single page, in characters.
pub const MAX_MARKDOWN_LENGTH: usize = 1_000_000;

/// One captured page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CacheEntry {
    /// Page address at capture time.
    pub url: String,
    /// Extracted markdown body.
    pub markdown: String,
    /// Capture time in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl CacheEntry {
    pub fn new(url: impl Into<String>, markdown: impl Into<String>, timestamp: i64) -> Self {
        Self { url: url.into(), markdown: markdown.into(), timestamp }
    }
}

/// Read-only view of the session fields used by presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub active: bool,
    pub pages_count: u64,
    pub start_time: Option<i64>,
}

/// Length of a markdown body as counted against [`MAX_MARKDOWN_LENGTH`].
pub fn markdown_len(markdown: &str) -> usize {
    markdown.chars().count()
}

/// Parse a persisted value into well-formed entries.
///
/// Non-array input yields an empty list. Array items that are not entries,
/// or whose markdown exceeds `max_markdown_chars`, are skipped.
pub fn normalize_cache_entries(value: Option<Value>, max_markdown_chars: usize) -> Vec<CacheEntry> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };

    let total = items.len();
    let entries: Vec<CacheEntry> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<CacheEntry>(item).ok())
        .filter(|entry| markdown_len(&entry.markdown) <= max_markdown_chars)
        .collect();

    if entries.len() < total {
        tracing::debug!(dropped = total - entries.len(), kept = entries.len(), "dropped malformed cache entries");
    }

    entries
}
