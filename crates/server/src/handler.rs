//! MCP server handler implementation.
//!
//! Routes tool calls onto the shared session cache.
use std::path::PathBuf;
use std::sync::Arc;

use crate::tools::capture::{CacheMarkdownParams, CheckUrlParams, cache_markdown_impl, check_url_impl};
use crate::tools::export::{DownloadSessionParams, download_impl};
use crate::tools::session::{start_impl, status_impl, stop_impl};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use tabbear_core::SessionCache;

/// The main MCP server handler for tab-bear.
#[derive(Clone)]
pub struct TabBearServer {
    cache: Arc<SessionCache>,
    export_dir: PathBuf,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl TabBearServer {
    pub fn new(cache: Arc<SessionCache>, export_dir: impl Into<PathBuf>) -> Self {
        Self { cache, export_dir: export_dir.into(), tool_router: Self::tool_router() }
    }

    #[tool(description = "Start a capture session. Clears previously captured pages.")]
    async fn start_session(&self) -> Result<CallToolResult, McpError> {
        start_impl(&self.cache).await
    }

    #[tool(description = "Stop the capture session. Captured pages are kept for download.")]
    async fn stop_session(&self) -> Result<CallToolResult, McpError> {
        stop_impl(&self.cache).await
    }

    #[tool(description = "Report whether a session is active, how many pages it holds and when it started.")]
    async fn session_status(&self) -> Result<CallToolResult, McpError> {
        status_impl(&self.cache).await
    }

    /// Store page markdown in the active session.
    ///
    /// Skipped when no session is active, no tab id is given, or the markdown
    /// exceeds the size limit. The oldest page is evicted past the entry limit.
    #[tool(description = "Store a page's markdown in the active session. Returns whether it was stored and why not.")]
    async fn cache_markdown(&self, params: Parameters<CacheMarkdownParams>) -> Result<CallToolResult, McpError> {
        cache_markdown_impl(&self.cache, params.0).await
    }

    #[tool(description = "Check whether a URL is already captured in the session. Exact match.")]
    async fn check_url(&self, params: Parameters<CheckUrlParams>) -> Result<CallToolResult, McpError> {
        check_url_impl(&self.cache, params.0).await
    }

    #[tool(description = "Serialize captured pages into one document and write it to the export directory.")]
    async fn download_session(&self, params: Parameters<DownloadSessionParams>) -> Result<CallToolResult, McpError> {
        download_impl(&self.cache, &self.export_dir, params.0).await
    }
}

impl ServerHandler for TabBearServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "tab-bear".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
