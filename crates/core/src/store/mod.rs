//! Storage capabilities behind the session cache.
//!
//! Two stores are kept apart on purpose of access pattern:
//!
//! - [`MetadataStore`]: small named JSON values (`activeSession`, `cacheIndex`,
//!   `pagesCount`, `sessionStartTime`) that are cheap to read on every UI refresh.
//! - [`BulkStore`]: one record holding the full list of captured entries.
//!
//! Both have a SQLite implementation (sharing one [`SessionDb`]) and an
//! in-memory implementation for tests and embedders.

pub mod bulk;
pub mod connection;
pub mod memory;
pub mod metadata;
pub mod migrations;

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::Error;
use crate::model::{CacheEntry, normalize_cache_entries};

pub use bulk::SqliteBulkStore;
pub use connection::SessionDb;
pub use memory::{MemoryBulkStore, MemoryMetadataStore};
pub use metadata::SqliteMetadataStore;

/// Named keys of the metadata store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaKey {
    ActiveSession,
    CacheIndex,
    PagesCount,
    SessionStartTime,
}

impl MetaKey {
    pub const ALL: [MetaKey; 4] =
        [MetaKey::ActiveSession, MetaKey::CacheIndex, MetaKey::PagesCount, MetaKey::SessionStartTime];

    /// Persisted key name.
    pub fn as_str(self) -> &'static str {
        match self {
            MetaKey::ActiveSession => "activeSession",
            MetaKey::CacheIndex => "cacheIndex",
            MetaKey::PagesCount => "pagesCount",
            MetaKey::SessionStartTime => "sessionStartTime",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

/// Raw values read from the metadata store.
///
/// Accessors return `None` when a key is absent or holds the wrong shape, so
/// callers decide how to heal each field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMetadata {
    values: HashMap<MetaKey, Value>,
}

impl RawMetadata {
    pub fn insert(&mut self, key: MetaKey, value: Value) {
        self.values.insert(key, value);
    }

    pub fn get(&self, key: MetaKey) -> Option<&Value> {
        self.values.get(&key)
    }

    pub fn active_session(&self) -> Option<bool> {
        self.get(MetaKey::ActiveSession).and_then(Value::as_bool)
    }

    pub fn cache_index(&self) -> Option<Vec<String>> {
        match self.get(MetaKey::CacheIndex)? {
            Value::Array(items) => Some(items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect()),
            _ => None,
        }
    }

    pub fn pages_count(&self) -> Option<u64> {
        self.get(MetaKey::PagesCount).and_then(Value::as_u64)
    }

    /// `Some(None)` for a stored null, `None` for absent or malformed.
    pub fn session_start_time(&self) -> Option<Option<i64>> {
        match self.get(MetaKey::SessionStartTime)? {
            Value::Null => Some(None),
            v => v.as_i64().map(Some),
        }
    }
}

/// A set of metadata writes applied together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataPatch {
    pub active_session: Option<bool>,
    pub cache_index: Option<Vec<String>>,
    pub pages_count: Option<u64>,
    pub session_start_time: Option<Option<i64>>,
}

impl MetadataPatch {
    pub fn is_empty(&self) -> bool {
        self.active_session.is_none()
            && self.cache_index.is_none()
            && self.pages_count.is_none()
            && self.session_start_time.is_none()
    }

    /// Keys touched by this patch, paired with their JSON values.
    pub fn into_values(self) -> Vec<(MetaKey, Value)> {
        let mut out = Vec::new();
        if let Some(active) = self.active_session {
            out.push((MetaKey::ActiveSession, Value::Bool(active)));
        }
        if let Some(index) = self.cache_index {
            out.push((MetaKey::CacheIndex, json!(index)));
        }
        if let Some(count) = self.pages_count {
            out.push((MetaKey::PagesCount, json!(count)));
        }
        if let Some(start) = self.session_start_time {
            out.push((MetaKey::SessionStartTime, json!(start)));
        }
        out
    }
}

/// Fast store for small session fields.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Read the requested keys. Missing keys are simply absent from the result.
    async fn get(&self, keys: &[MetaKey]) -> Result<RawMetadata, Error>;

    /// Write every key in the patch as one operation.
    async fn set(&self, patch: MetadataPatch) -> Result<(), Error>;
}

/// Store for the full capture collection.
#[async_trait]
pub trait BulkStore: Send + Sync {
    /// Read the persisted entries value as-is, `None` if no record exists.
    async fn read_raw(&self) -> Result<Option<Value>, Error>;

    /// Replace the persisted collection.
    async fn write(&self, entries: &[CacheEntry]) -> Result<(), Error>;

    /// Read and normalize the persisted collection.
    async fn load(&self, max_markdown_chars: usize) -> Result<Vec<CacheEntry>, Error> {
        Ok(normalize_cache_entries(self.read_raw().await?, max_markdown_chars))
    }
}
