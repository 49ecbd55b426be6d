//! tab-bear MCP server entry point.
//!
//! Boots the session cache from configuration and serves it on stdio.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tabbear_core::{AppConfig, SessionCache};
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(db = %config.db_path.display(), "Starting tab-bear server on stdio transport");

    let cache = SessionCache::open(&config.db_path, config.limits()).await?;
    if cache.ensure_defaults().await? {
        tracing::info!("initialized session defaults");
    }

    let handler = handler::TabBearServer::new(Arc::new(cache), config.export_dir.clone());
    let server = serve_server(handler, stdio()).await?;

    server.waiting().await?;

    Ok(())
}
