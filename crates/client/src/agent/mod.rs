//! Capture agent.
//!
//! Runs against one loaded page: converts its body to markdown through a
//! [`MarkdownConverter`], cleans the result, prefixes the page title as a
//! level-1 heading, and builds the `CACHE_MARKDOWN` message for the writer.

pub mod clean;

pub use clean::{clean_markdown, is_valid_markdown_line};

use std::sync::LazyLock;

use scraper::{Html, Selector};
use tabbear_core::Message;

use crate::dispatch::is_injectable_url;

static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").expect("invalid selector"));
static BODY_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").expect("invalid selector"));

/// Errors raised while capturing a page.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AgentError {
    #[error("CONVERT_FAILED: {0}")]
    ConvertFailed(String),
}

/// HTML to markdown conversion.
pub trait MarkdownConverter: Send + Sync {
    fn html_to_markdown(&self, html: &str) -> Result<String, AgentError>;
}

/// A loaded page as seen by the agent.
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    pub url: String,
    pub html: String,
}

/// Trimmed `<title>` text, empty when the page has none.
pub fn page_title(document: &Html) -> String {
    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Inner HTML of `<body>`, or the whole document when there is no body.
fn body_html(document: &Html, html: &str) -> String {
    document
        .select(&BODY_SELECTOR)
        .next()
        .map(|el| el.inner_html())
        .unwrap_or_else(|| html.to_string())
}

/// Build the capture message for a page.
///
/// Returns `Ok(None)` for pages the agent does not run on (non-http(s)).
pub fn capture_page(page: &PageSnapshot, converter: &dyn MarkdownConverter) -> Result<Option<Message>, AgentError> {
    if !is_injectable_url(Some(&page.url)) {
        tracing::debug!(url = %page.url, "not a capturable page");
        return Ok(None);
    }

    let document = Html::parse_document(&page.html);
    let title = page_title(&document);
    let converted = converter.html_to_markdown(&body_html(&document, &page.html))?;

    let markdown = format!("# {title}\n\n{}", clean_markdown(&converted));
    Ok(Some(Message::CacheMarkdown { url: page.url.clone(), markdown }))
}
