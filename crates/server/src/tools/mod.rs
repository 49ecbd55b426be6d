//! MCP tool implementations.
//!
//! This module contains all tools exposed by the tab-bear server. Each tool
//! maps onto one boundary message of the session cache.

pub mod capture;
pub mod export;
pub mod session;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;
use tabbear_core::Error;

/// Pretty-printed JSON tool result.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output).map_err(Error::from)?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use rmcp::model::CallToolResult;
    use serde::de::DeserializeOwned;
    use tabbear_core::SessionCache;
    use tabbear_core::store::{MemoryBulkStore, MemoryMetadataStore};

    pub(crate) fn memory_cache() -> SessionCache {
        SessionCache::new(Arc::new(MemoryMetadataStore::new()), Arc::new(MemoryBulkStore::new()))
    }

    /// Decode the JSON text of the first content block.
    pub(crate) fn decode<T: DeserializeOwned>(result: &CallToolResult) -> T {
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let text = content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content");
        serde_json::from_str(text).unwrap()
    }
}
