//! download_session tool implementation.
//!
//! Serializes the captured pages and writes them to the export directory.

use std::path::Path;

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tabbear_core::serialize::format_token_count;
use tabbear_core::{Message, MessageOutcome, SessionCache};

use super::json_result;

/// Parameters for the download_session tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DownloadSessionParams {
    /// Include the serialized document in the response.
    #[serde(default)]
    pub include_content: bool,
}

/// Output from the download_session tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DownloadSessionOutput {
    /// False when no pages were captured; nothing is written then.
    pub exported: bool,
    pub path: Option<String>,
    pub filename: Option<String>,
    pub page_count: usize,
    /// Token estimate, e.g. `12.3k`.
    pub tokens: Option<String>,
    pub prefer_download: bool,
    pub content: Option<String>,
}

/// Implementation of the download_session tool.
pub async fn download_impl(
    cache: &SessionCache, export_dir: &Path, params: DownloadSessionParams,
) -> Result<CallToolResult, McpError> {
    let export = match cache.handle(Message::DownloadSession, None).await? {
        MessageOutcome::Exported { export } => export,
        _ => None,
    };

    let Some(export) = export else {
        return json_result(&DownloadSessionOutput {
            exported: false,
            path: None,
            filename: None,
            page_count: 0,
            tokens: None,
            prefer_download: false,
            content: None,
        });
    };

    let path = export.write_to(export_dir).await?;

    json_result(&DownloadSessionOutput {
        exported: true,
        path: Some(path.display().to_string()),
        filename: Some(export.filename),
        page_count: export.page_count,
        tokens: Some(format_token_count(export.token_estimate)),
        prefer_download: export.prefer_download,
        content: params.include_content.then_some(export.content),
    })
}
