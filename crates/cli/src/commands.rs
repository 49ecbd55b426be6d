//! Subcommand execution against a session cache.
//!
//! Each command returns the text to print so it can be checked without a terminal.

use std::path::Path;

use anyhow::{Context, Result};
use tabbear_core::serialize::format_token_count;
use tabbear_core::{AppendOutcome, SessionCache};

use crate::args::Command;

pub async fn run(cache: &SessionCache, command: Command, export_dir: &Path) -> Result<String> {
    tracing::debug!(?command, "running command");
    match command {
        Command::Status { json } => status(cache, json).await,
        Command::Start => {
            cache.start().await?;
            Ok("session started".to_string())
        }
        Command::Stop => {
            cache.stop().await?;
            let state = cache.snapshot().await?;
            Ok(format!("session stopped, {} pages kept", state.pages_count))
        }
        Command::Append { url, file, tab } => {
            let markdown = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            match cache.append(&url, &markdown, tab).await? {
                AppendOutcome::Stored { pages_count } => Ok(format!("stored {url} ({pages_count} pages)")),
                AppendOutcome::Rejected { reason } => Ok(format!("skipped {url}: {reason:?}")),
            }
        }
        Command::Export { out, stdout } => export(cache, out.as_deref().unwrap_or(export_dir), stdout).await,
        Command::Check { url } => {
            let cached = cache.is_url_cached(&url).await?;
            Ok(if cached { format!("{url} is captured") } else { format!("{url} is not captured") })
        }
    }
}

async fn status(cache: &SessionCache, json: bool) -> Result<String> {
    let state = cache.snapshot().await?;
    if json {
        return Ok(serde_json::to_string_pretty(&state)?);
    }

    let started = state
        .start_time
        .map_or_else(|| "-".to_string(), |ms| ms.to_string());
    Ok(format!(
        "active: {}\npages: {}\nstarted: {started}",
        if state.active { "yes" } else { "no" },
        state.pages_count
    ))
}

async fn export(cache: &SessionCache, dir: &Path, stdout: bool) -> Result<String> {
    let Some(export) = cache.export().await? else {
        return Ok("nothing captured".to_string());
    };

    if stdout {
        return Ok(export.content);
    }

    let path = export.write_to(dir).await?;
    let mut summary = format!(
        "wrote {} ({} pages, ~{} tokens)",
        path.display(),
        export.page_count,
        format_token_count(export.token_estimate)
    );
    if export.prefer_download {
        summary.push_str("\nlarge session, attach the file rather than pasting it");
    }
    Ok(summary)
}
