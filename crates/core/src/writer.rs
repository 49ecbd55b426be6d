//! Serialized cache writer.
//!
//! `append` is the only path that grows the capture collection. Each call
//! takes a turn on the write queue, reads fresh state, and either stores the
//! page (trimming to the newest entries and rewriting index and counter
//! together) or returns a rejection without touching the collection.

use serde::Serialize;

use crate::Error;
use crate::index::{index_urls, rebuild_index};
use crate::model::{CacheEntry, markdown_len};
use crate::session::SessionCache;
use crate::store::{MetaKey, MetadataPatch};

/// Why a capture was not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// No session is running.
    Inactive,
    /// The capture did not come from a tab.
    MissingTab,
    /// The markdown body is over the configured limit.
    Oversized,
}

/// Result of a call to [`SessionCache::append`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, schemars::JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AppendOutcome {
    Stored { pages_count: u64 },
    Rejected { reason: RejectReason },
}

/// Keep the newest `max` entries.
fn trim_cache(mut cache: Vec<CacheEntry>, max: usize) -> Vec<CacheEntry> {
    if cache.len() > max {
        cache.drain(..cache.len() - max);
    }
    cache
}

impl SessionCache {
    /// Record one captured page.
    ///
    /// Rejections (inactive session, no source tab, oversized body) are not
    /// errors. Store failures are returned to the caller and leave the queue
    /// usable for the next call.
    pub async fn append(&self, url: &str, markdown: &str, tab_id: Option<u32>) -> Result<AppendOutcome, Error> {
        tracing::trace!(url, queued = self.queue.pending(), "append queued");
        self.queue
            .run(|| self.append_locked(url, markdown, tab_id))
            .await
    }

    async fn append_locked(&self, url: &str, markdown: &str, tab_id: Option<u32>) -> Result<AppendOutcome, Error> {
        let limits = self.limits;
        let data = self
            .meta
            .get(&[MetaKey::ActiveSession, MetaKey::PagesCount, MetaKey::CacheIndex])
            .await?;
        let mut cache = self.bulk.load(limits.max_markdown_chars).await?;

        let stored_count = data.pages_count();
        let current_count = stored_count.unwrap_or(cache.len() as u64);
        let index_missing = data.cache_index().is_none();
        if index_missing {
            tracing::warn!(entries = cache.len(), "cache index missing, rebuilding from collection");
            self.meta
                .set(MetadataPatch {
                    cache_index: Some(rebuild_index(&cache, limits.max_entries)),
                    pages_count: Some(current_count),
                    ..Default::default()
                })
                .await?;
        }

        let rejection = if data.active_session() != Some(true) {
            Some(RejectReason::Inactive)
        } else if tab_id.is_none() {
            Some(RejectReason::MissingTab)
        } else if markdown_len(markdown) > limits.max_markdown_chars {
            Some(RejectReason::Oversized)
        } else {
            None
        };

        if let Some(reason) = rejection {
            if stored_count.is_none() && !index_missing {
                tracing::warn!(pages_count = current_count, "page counter missing, backfilling");
                self.meta
                    .set(MetadataPatch { pages_count: Some(current_count), ..Default::default() })
                    .await?;
            }
            tracing::debug!(url, ?reason, "capture rejected");
            return Ok(AppendOutcome::Rejected { reason });
        }

        cache.push(CacheEntry::new(url, markdown, chrono::Utc::now().timestamp_millis()));
        let next = trim_cache(cache, limits.max_entries);
        self.bulk.write(&next).await?;

        let pages_count = next.len() as u64;
        self.meta
            .set(MetadataPatch {
                cache_index: Some(index_urls(&next)),
                pages_count: Some(pages_count),
                ..Default::default()
            })
            .await?;

        tracing::debug!(url, tab_id, pages_count, "page captured");
        Ok(AppendOutcome::Stored { pages_count })
    }
}
