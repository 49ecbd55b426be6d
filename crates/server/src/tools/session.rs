//! Session lifecycle tools: start_session, stop_session, session_status.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tabbear_core::{Message, SessionCache, SessionState};

use super::json_result;

/// Output of the session tools.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SessionStatusOutput {
    /// Session flags after the call.
    pub session: SessionState,
    /// Writes waiting on or holding the write queue.
    pub pending_writes: usize,
}

async fn status(cache: &SessionCache) -> Result<CallToolResult, McpError> {
    let session = cache.snapshot().await?;
    json_result(&SessionStatusOutput { session, pending_writes: cache.pending_writes() })
}

/// Implementation of the start_session tool.
pub async fn start_impl(cache: &SessionCache) -> Result<CallToolResult, McpError> {
    cache.handle(Message::StartSession, None).await?;
    status(cache).await
}

/// Implementation of the stop_session tool.
pub async fn stop_impl(cache: &SessionCache) -> Result<CallToolResult, McpError> {
    cache.handle(Message::StopSession, None).await?;
    status(cache).await
}

/// Implementation of the session_status tool.
pub async fn status_impl(cache: &SessionCache) -> Result<CallToolResult, McpError> {
    status(cache).await
}
