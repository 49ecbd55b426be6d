//! In-memory stores.
//!
//! Every operation yields to the scheduler once before touching state, so
//! concurrent callers interleave at the same points they would against a real
//! asynchronous store. Writes can be made to fail to exercise error paths.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use super::{BulkStore, MetaKey, MetadataPatch, MetadataStore, RawMetadata};
use crate::Error;
use crate::model::CacheEntry;

/// In-memory metadata store.
#[derive(Debug, Default)]
pub struct MemoryMetadataStore {
    values: Mutex<HashMap<MetaKey, Value>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed raw values, bypassing shape checks.
    pub fn with_values(values: impl IntoIterator<Item = (MetaKey, Value)>) -> Self {
        let store = Self::default();
        store.lock().extend(values);
        store
    }

    /// Raw value currently held for `key`.
    pub fn value(&self, key: MetaKey) -> Option<Value> {
        self.lock().get(&key).cloned()
    }

    /// Number of successful `set` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make subsequent `set` calls fail with a storage error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<MetaKey, Value>> {
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn get(&self, keys: &[MetaKey]) -> Result<RawMetadata, Error> {
        tokio::task::yield_now().await;
        let values = self.lock();
        let mut raw = RawMetadata::default();
        for key in keys {
            if let Some(value) = values.get(key) {
                raw.insert(*key, value.clone());
            }
        }
        Ok(raw)
    }

    async fn set(&self, patch: MetadataPatch) -> Result<(), Error> {
        tokio::task::yield_now().await;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Storage("quota exceeded".into()));
        }
        self.lock().extend(patch.into_values());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// In-memory bulk store.
#[derive(Debug, Default)]
pub struct MemoryBulkStore {
    record: Mutex<Option<Value>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryBulkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the raw record, bypassing shape checks.
    pub fn with_raw(value: Value) -> Self {
        let store = Self::default();
        *store.lock() = Some(value);
        store
    }

    /// Number of successful `write` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make subsequent `write` calls fail with a storage error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Value>> {
        self.record.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl BulkStore for MemoryBulkStore {
    async fn read_raw(&self) -> Result<Option<Value>, Error> {
        tokio::task::yield_now().await;
        Ok(self.lock().clone())
    }

    async fn write(&self, entries: &[CacheEntry]) -> Result<(), Error> {
        tokio::task::yield_now().await;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Storage("quota exceeded".into()));
        }
        *self.lock() = Some(serde_json::to_value(entries)?);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MAX_MARKDOWN_LENGTH;
    use serde_json::json;

    #[tokio::test]
    async fn test_metadata_set_get() {
        let store = MemoryMetadataStore::new();
        store.set(MetadataPatch { pages_count: Some(4), ..Default::default() }).await.unwrap();

        assert_eq!(store.get(&[MetaKey::PagesCount]).await.unwrap().pages_count(), Some(4));
        assert_eq!(store.value(MetaKey::PagesCount), Some(json!(4)));
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_metadata_failure_leaves_state() {
        let store = MemoryMetadataStore::with_values([(MetaKey::PagesCount, json!(1))]);
        store.fail_writes(true);

        let result = store.set(MetadataPatch { pages_count: Some(2), ..Default::default() }).await;
        assert!(matches!(result, Err(Error::Storage(_))));
        assert_eq!(store.value(MetaKey::PagesCount), Some(json!(1)));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_bulk_round_trip() {
        let store = MemoryBulkStore::new();
        let entries = vec![CacheEntry::new("https://a.com", "# A", 1)];
        store.write(&entries).await.unwrap();

        assert_eq!(store.load(MAX_MARKDOWN_LENGTH).await.unwrap(), entries);
    }

    #[tokio::test]
    async fn test_bulk_raw_is_normalized_on_load() {
        let store = MemoryBulkStore::with_raw(json!([{"url": "x", "markdown": "y", "timestamp": 1}, 7]));
        let entries = store.load(MAX_MARKDOWN_LENGTH).await.unwrap();
        assert_eq!(entries, vec![CacheEntry::new("x", "y", 1)]);
    }
}
