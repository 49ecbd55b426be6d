//! Cache index maintenance.
//!
//! The index is the list of captured URLs kept next to the session flags so
//! the page indicator can answer "already captured?" without loading bodies.

use std::collections::HashSet;

use crate::model::CacheEntry;

/// URLs of `entries`, in order. This is what the writer persists after
/// every mutation.
pub fn index_urls(entries: &[CacheEntry]) -> Vec<String> {
    entries.iter().map(|e| e.url.clone()).collect()
}

/// Exact membership test. Trailing slashes, queries and fragments all count.
pub fn is_url_cached(index: &[String], url: &str) -> bool {
    index.iter().any(|u| u == url)
}

/// Rebuild an index from entries: first-seen order, duplicates removed,
/// at most the last `max_entries` URLs kept.
pub fn rebuild_index(entries: &[CacheEntry], max_entries: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut urls: Vec<String> = entries
        .iter()
        .filter(|e| seen.insert(e.url.as_str()))
        .map(|e| e.url.clone())
        .collect();

    if urls.len() > max_entries {
        urls.drain(..urls.len() - max_entries);
    }
    urls
}
