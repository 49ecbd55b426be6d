//! Capture tools: cache_markdown and check_url.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tabbear_core::{AppendOutcome, Error, Message, MessageOutcome, SessionCache};

use super::json_result;

/// Parameters for the cache_markdown tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheMarkdownParams {
    /// Page address at capture time.
    pub url: String,

    /// Markdown extracted from the page.
    pub markdown: String,

    /// Id of the tab the capture came from. Captures without one are ignored.
    #[serde(default)]
    pub tab_id: Option<u32>,
}

/// Output from the cache_markdown tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheMarkdownOutput {
    /// Whether the page was stored.
    pub stored: bool,
    /// Pages held after the call, when stored.
    pub pages_count: Option<u64>,
    /// Why the page was skipped, when not stored.
    pub reason: Option<String>,
}

impl From<AppendOutcome> for CacheMarkdownOutput {
    fn from(outcome: AppendOutcome) -> Self {
        match outcome {
            AppendOutcome::Stored { pages_count } => Self { stored: true, pages_count: Some(pages_count), reason: None },
            AppendOutcome::Rejected { reason } => Self {
                stored: false,
                pages_count: None,
                reason: serde_json::to_value(reason).ok().and_then(|v| v.as_str().map(str::to_string)),
            },
        }
    }
}

/// Parameters for the check_url tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CheckUrlParams {
    /// URL to look up, compared exactly.
    pub url: String,
}

/// Output from the check_url tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CheckUrlOutput {
    pub url: String,
    pub cached: bool,
}

/// Implementation of the cache_markdown tool.
pub async fn cache_markdown_impl(cache: &SessionCache, params: CacheMarkdownParams) -> Result<CallToolResult, McpError> {
    if params.url.is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }

    let message = Message::CacheMarkdown { url: params.url, markdown: params.markdown };
    let output = match cache.handle(message, params.tab_id).await? {
        MessageOutcome::Cached { result } => CacheMarkdownOutput::from(result),
        other => return Err(Error::InvalidInput(format!("unexpected outcome: {other:?}")).into()),
    };

    json_result(&output)
}

/// Implementation of the check_url tool.
pub async fn check_url_impl(cache: &SessionCache, params: CheckUrlParams) -> Result<CallToolResult, McpError> {
    let cached = cache.is_url_cached(&params.url).await?;
    json_result(&CheckUrlOutput { url: params.url, cached })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{decode, memory_cache};

    fn params(url: &str, tab_id: Option<u32>) -> CacheMarkdownParams {
        CacheMarkdownParams { url: url.into(), markdown: "# Page".into(), tab_id }
    }

    #[tokio::test]
    async fn test_cache_markdown_stores_when_active() {
        let cache = memory_cache();
        cache.start().await.unwrap();

        let output: CacheMarkdownOutput =
            decode(&cache_markdown_impl(&cache, params("https://a.com", Some(1))).await.unwrap());
        assert!(output.stored);
        assert_eq!(output.pages_count, Some(1));

        let check: CheckUrlOutput =
            decode(&check_url_impl(&cache, CheckUrlParams { url: "https://a.com".into() }).await.unwrap());
        assert!(check.cached);
    }

    #[tokio::test]
    async fn test_cache_markdown_reports_rejection() {
        let cache = memory_cache();

        let output: CacheMarkdownOutput =
            decode(&cache_markdown_impl(&cache, params("https://a.com", Some(1))).await.unwrap());
        assert!(!output.stored);
        assert_eq!(output.reason.as_deref(), Some("inactive"));

        cache.start().await.unwrap();
        let output: CacheMarkdownOutput = decode(&cache_markdown_impl(&cache, params("https://a.com", None)).await.unwrap());
        assert_eq!(output.reason.as_deref(), Some("missing_tab"));
    }

    #[tokio::test]
    async fn test_cache_markdown_empty_url() {
        let cache = memory_cache();
        let result = cache_markdown_impl(&cache, params("", Some(1))).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_check_url_is_exact() {
        let cache = memory_cache();
        cache.start().await.unwrap();
        cache.append("https://a.com/", "# A", Some(1)).await.unwrap();

        let check: CheckUrlOutput =
            decode(&check_url_impl(&cache, CheckUrlParams { url: "https://a.com".into() }).await.unwrap());
        assert!(!check.cached);
    }
}
