//! Session export.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;

use crate::Error;
use crate::model::markdown_len;
use crate::serialize::{estimate_tokens, serialize_session, should_prefer_download};
use crate::session::SessionCache;

/// Fixed filename used when the export date is not wanted in the name.
pub const SESSION_FILENAME: &str = "tab-bear-session.txt";

/// MIME type of the exported document.
pub const EXPORT_MIME_TYPE: &str = "text/plain";

/// `tab-bear-session-<YYYY-MM-DD>.md`
pub fn export_filename(date: NaiveDate) -> String {
    format!("tab-bear-session-{}.md", date.format("%Y-%m-%d"))
}

/// A serialized session ready to be copied or downloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, schemars::JsonSchema)]
pub struct SessionExport {
    pub filename: String,
    pub mime_type: String,
    pub content: String,
    pub page_count: usize,
    pub token_estimate: u64,
    /// Whether presentation layers should offer a download rather than a copy.
    pub prefer_download: bool,
}

impl SessionExport {
    /// Write the document into `dir` under its filename.
    pub async fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf, Error> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| Error::ExportFailed(format!("{}: {e}", dir.display())))?;

        let path = dir.join(&self.filename);
        tokio::fs::write(&path, self.content.as_bytes())
            .await
            .map_err(|e| Error::ExportFailed(format!("{}: {e}", path.display())))?;

        tracing::info!(path = %path.display(), pages = self.page_count, "session exported");
        Ok(path)
    }
}

impl SessionCache {
    /// Serialize the current collection. `None` when nothing was captured.
    pub async fn export(&self) -> Result<Option<SessionExport>, Error> {
        let entries = self.entries().await?;
        if entries.is_empty() {
            tracing::debug!("export skipped, no pages captured");
            return Ok(None);
        }

        let content = serialize_session(&entries);
        Ok(Some(SessionExport {
            filename: export_filename(chrono::Utc::now().date_naive()),
            mime_type: EXPORT_MIME_TYPE.to_string(),
            token_estimate: estimate_tokens(&content),
            prefer_download: should_prefer_download(entries.len(), markdown_len(&content)),
            page_count: entries.len(),
            content,
        }))
    }
}
