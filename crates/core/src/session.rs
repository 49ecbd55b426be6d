//! Session state machine.
//!
//! [`SessionCache`] owns both stores and the write queue. This module holds
//! the lifecycle transitions (`start`, `stop`, `ensure_defaults`) and the
//! read-side queries; the capture path lives in [`crate::writer`].
//!
//! ```text
//!            start()                 stop()
//!   Idle ─────────────► Active ─────────────► Idle
//!     ▲ └──── stop() ───┘  │ ▲                  │
//!     │                    └─┘ start()          │
//!     └─────────────────────────────────────────┘
//! ```
//!
//! `start` always wipes the collection; `stop` only flips the flags.

use std::sync::Arc;

use crate::Error;
use crate::index::is_url_cached;
use crate::model::{CacheEntry, MAX_MARKDOWN_LENGTH, SessionState};
use crate::queue::WriteQueue;
use crate::store::{
    BulkStore, MetaKey, MetadataPatch, MetadataStore, SessionDb, SqliteBulkStore, SqliteMetadataStore,
};

/// Maximum number of entries kept in the bulk collection.
pub const MAX_CACHE_ENTRIES: usize = 100;

/// Bounds enforced by the writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheLimits {
    pub max_entries: usize,
    pub max_markdown_chars: usize,
}

impl Default for CacheLimits {
    fn default() -> Self {
        Self { max_entries: MAX_CACHE_ENTRIES, max_markdown_chars: MAX_MARKDOWN_LENGTH }
    }
}

/// Session state plus the capture collection, behind one write queue.
pub struct SessionCache {
    pub(crate) meta: Arc<dyn MetadataStore>,
    pub(crate) bulk: Arc<dyn BulkStore>,
    pub(crate) queue: WriteQueue,
    pub(crate) limits: CacheLimits,
}

impl SessionCache {
    pub fn new(meta: Arc<dyn MetadataStore>, bulk: Arc<dyn BulkStore>) -> Self {
        Self::with_limits(meta, bulk, CacheLimits::default())
    }

    pub fn with_limits(meta: Arc<dyn MetadataStore>, bulk: Arc<dyn BulkStore>, limits: CacheLimits) -> Self {
        Self { meta, bulk, queue: WriteQueue::new(), limits }
    }

    /// Open both stores on the SQLite database at `path`.
    pub async fn open(path: impl AsRef<std::path::Path>, limits: CacheLimits) -> Result<Self, Error> {
        let db = SessionDb::open(path).await?;
        Ok(Self::from_db(db, limits))
    }

    pub fn from_db(db: SessionDb, limits: CacheLimits) -> Self {
        Self::with_limits(
            Arc::new(SqliteMetadataStore::new(db.clone())),
            Arc::new(SqliteBulkStore::new(db)),
            limits,
        )
    }

    /// Writes queued or in progress.
    pub fn pending_writes(&self) -> usize {
        self.queue.pending()
    }

    pub fn limits(&self) -> CacheLimits {
        self.limits
    }

    /// Start a session: clear the collection, set the flags, reset index and counter.
    ///
    /// Runs through the write queue so it cannot interleave with an append.
    pub async fn start(&self) -> Result<(), Error> {
        self.queue
            .run(|| async {
                let now = chrono::Utc::now().timestamp_millis();
                tokio::try_join!(
                    self.bulk.write(&[]),
                    self.meta.set(MetadataPatch {
                        active_session: Some(true),
                        cache_index: Some(Vec::new()),
                        pages_count: Some(0),
                        session_start_time: Some(Some(now)),
                    }),
                )?;
                tracing::info!(start_time = now, "session started");
                Ok(())
            })
            .await
    }

    /// Stop the session. Captured pages, index and counter are kept.
    pub async fn stop(&self) -> Result<(), Error> {
        self.queue
            .run(|| async {
                self.meta
                    .set(MetadataPatch {
                        active_session: Some(false),
                        session_start_time: Some(None),
                        ..Default::default()
                    })
                    .await?;
                tracing::info!("session stopped");
                Ok(())
            })
            .await
    }

    /// Fill in any session field that is missing or malformed.
    ///
    /// Valid values are never overwritten, and nothing is written when every
    /// field is already valid. Returns whether a write happened. Not queued:
    /// it only fills gaps, so racing an append is harmless.
    pub async fn ensure_defaults(&self) -> Result<bool, Error> {
        let data = self.meta.get(&MetaKey::ALL).await?;

        let mut patch = MetadataPatch::default();
        if data.active_session().is_none() {
            patch.active_session = Some(false);
        }
        if data.cache_index().is_none() {
            patch.cache_index = Some(Vec::new());
        }
        if data.pages_count().is_none() {
            patch.pages_count = Some(0);
        }
        if data.session_start_time().is_none() {
            patch.session_start_time = Some(None);
        }

        if patch.is_empty() {
            return Ok(false);
        }

        tracing::debug!(?patch, "hydrating session defaults");
        self.meta.set(patch).await?;
        Ok(true)
    }

    /// Current session flags with lenient defaults for malformed values.
    pub async fn snapshot(&self) -> Result<SessionState, Error> {
        let data = self
            .meta
            .get(&[MetaKey::ActiveSession, MetaKey::PagesCount, MetaKey::SessionStartTime])
            .await?;

        Ok(SessionState {
            active: data.active_session().unwrap_or(false),
            pages_count: data.pages_count().unwrap_or(0),
            start_time: data.session_start_time().flatten(),
        })
    }

    /// The captured pages, oldest first.
    pub async fn entries(&self) -> Result<Vec<CacheEntry>, Error> {
        self.bulk.load(self.limits.max_markdown_chars).await
    }

    /// Whether `url` is in the index. Reads only the metadata store.
    pub async fn is_url_cached(&self, url: &str) -> Result<bool, Error> {
        let data = self.meta.get(&[MetaKey::CacheIndex]).await?;
        Ok(data
            .cache_index()
            .is_some_and(|index| is_url_cached(&index, url)))
    }
}
