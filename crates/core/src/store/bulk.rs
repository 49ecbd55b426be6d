//! SQLite-backed bulk entry store.
//!
//! The whole collection lives in a single `session_record` row keyed
//! `current`, written in one statement so a reader never sees half a list.

use async_trait::async_trait;
use serde_json::Value;
use tokio_rusqlite::{params, rusqlite};

use super::{BulkStore, SessionDb};
use crate::Error;
use crate::model::CacheEntry;

const RECORD_KEY: &str = "current";

/// Bulk store over the `session_record` table.
#[derive(Clone, Debug)]
pub struct SqliteBulkStore {
    db: SessionDb,
}

impl SqliteBulkStore {
    pub fn new(db: SessionDb) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BulkStore for SqliteBulkStore {
    async fn read_raw(&self) -> Result<Option<Value>, Error> {
        let text = self
            .db
            .conn
            .call(|conn| -> Result<Option<String>, Error> {
                let result = conn.query_row(
                    "SELECT entries FROM session_record WHERE key = ?1",
                    params![RECORD_KEY],
                    |row| row.get::<_, String>(0),
                );
                match result {
                    Ok(text) => Ok(Some(text)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        Ok(text.map(|text| {
            serde_json::from_str(&text).unwrap_or_else(|e| {
                tracing::warn!("unreadable session record: {e}");
                Value::Null
            })
        }))
    }

    async fn write(&self, entries: &[CacheEntry]) -> Result<(), Error> {
        let json = serde_json::to_string(entries)?;
        let updated_at = chrono::Utc::now().to_rfc3339();
        self.db
            .conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO session_record (key, entries, updated_at) VALUES (?1, ?2, ?3)
                    ON CONFLICT(key) DO UPDATE SET
                        entries = excluded.entries,
                        updated_at = excluded.updated_at",
                    params![RECORD_KEY, json, updated_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}
