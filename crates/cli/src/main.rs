//! tab-bear command-line entry point.

use anyhow::Result;
use clap::Parser;
use tabbear_core::{AppConfig, SessionCache};
use tracing_subscriber::EnvFilter;

mod args;
mod commands;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = args::Cli::parse();

    let filter = if cli.verbose { EnvFilter::new("debug") } else { EnvFilter::from_default_env() };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = AppConfig::load()?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    let cache = SessionCache::open(&config.db_path, config.limits()).await?;
    cache.ensure_defaults().await?;

    let output = commands::run(&cache, cli.command, &config.export_dir).await?;
    println!("{output}");

    Ok(())
}
