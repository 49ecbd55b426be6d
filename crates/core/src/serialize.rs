//! Session serializer.
//!
//! Turns the captured pages into one plain-text document:
//!
//! ```text
//! <session>
//!
//! <page url="https://www.example.com">
//! ---
//! Source: example.com
//! URL: https://www.example.com
//! Scraped Date: 2025-12-11
//! Title: Hi
//! ---
//!
//! # Hi
//! </page>
//!
//! </session>
//! ```

use std::sync::LazyLock;

use chrono::DateTime;
use regex::Regex;

use crate::model::CacheEntry;

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#\s+([^\r\n]+)").expect("title pattern is valid"));

/// Serialize entries, in order, into the session export format.
pub fn serialize_session(entries: &[CacheEntry]) -> String {
    let mut content = String::from("<session>\n\n");

    for entry in entries {
        content.push_str(&format!(
            "<page url=\"{url}\">\n{metadata}{markdown}\n</page>\n\n",
            url = entry.url,
            metadata = format_metadata(entry),
            markdown = entry.markdown,
        ));
    }

    content.push_str("</session>\n");
    content
}

fn format_metadata(entry: &CacheEntry) -> String {
    format!(
        "---\nSource: {source}\nURL: {url}\nScraped Date: {date}\nTitle: {title}\n---\n\n",
        source = source_host(&entry.url).unwrap_or_else(|| "unknown".into()),
        url = entry.url,
        date = scraped_date(entry.timestamp).unwrap_or_else(|| "unknown".into()),
        title = page_title(&entry.markdown).unwrap_or("Untitled"),
    )
}

/// Hostname of `url` without a leading `www.`.
fn source_host(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}

/// UTC calendar date (`YYYY-MM-DD`) of a millisecond timestamp.
fn scraped_date(timestamp: i64) -> Option<String> {
    DateTime::from_timestamp_millis(timestamp).map(|dt| dt.format("%Y-%m-%d").to_string())
}

/// Text of the first level-1 heading.
pub fn page_title(markdown: &str) -> Option<&str> {
    TITLE_RE
        .captures(markdown)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Rough token count: whitespace-delimited words divided by 0.75, rounded.
pub fn estimate_tokens(text: &str) -> u64 {
    let words = text.split_whitespace().count();
    (words as f64 / 0.75).round() as u64
}

/// Compact token count: `999`, `1.0k`, `1000.0k`, `1.0M`.
pub fn format_token_count(tokens: u64) -> String {
    if tokens >= 1_000_000 {
        format!("{}M", one_decimal(tokens, 1_000_000))
    } else if tokens >= 1000 {
        format!("{}k", one_decimal(tokens, 1000))
    } else {
        tokens.to_string()
    }
}

/// `tokens / unit` to one decimal place, halves rounded up.
///
/// Only quotients ending in .25 or .75 are exact binary halves; every other
/// value formats from its exact double, which never sits on a tie.
fn one_decimal(tokens: u64, unit: u64) -> String {
    let quarter = unit / 4;
    if tokens % quarter == 0 && (tokens / quarter) % 2 == 1 {
        let tenths = (tokens * 10 + unit / 2) / unit;
        return format!("{}.{}", tenths / 10, tenths % 10);
    }
    format!("{:.1}", tokens as f64 / unit as f64)
}

/// Whether a session is large enough that a file download beats a clipboard copy.
pub fn should_prefer_download(page_count: usize, content_length: usize) -> bool {
    page_count > 10 && content_length > 50_000
}
