//! SQLite-backed metadata store.
//!
//! Each key is one row holding a JSON value, so a value of the wrong shape
//! is read back as-is and left for the session layer to heal.

use async_trait::async_trait;
use serde_json::Value;
use tokio_rusqlite::params;

use super::{MetaKey, MetadataPatch, MetadataStore, RawMetadata, SessionDb};
use crate::Error;

/// Metadata store over the `metadata` table.
#[derive(Clone, Debug)]
pub struct SqliteMetadataStore {
    db: SessionDb,
}

impl SqliteMetadataStore {
    pub fn new(db: SessionDb) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MetadataStore for SqliteMetadataStore {
    async fn get(&self, keys: &[MetaKey]) -> Result<RawMetadata, Error> {
        let rows = self
            .db
            .conn
            .call(|conn| -> Result<Vec<(String, String)>, Error> {
                let mut stmt = conn.prepare("SELECT key, value FROM metadata")?;
                let rows = stmt
                    .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)?;

        let mut raw = RawMetadata::default();
        for (name, text) in rows {
            let Some(key) = MetaKey::parse(&name) else { continue };
            if !keys.contains(&key) {
                continue;
            }
            match serde_json::from_str::<Value>(&text) {
                Ok(value) => raw.insert(key, value),
                Err(e) => tracing::warn!(key = %name, "unreadable metadata value: {e}"),
            }
        }
        Ok(raw)
    }

    async fn set(&self, patch: MetadataPatch) -> Result<(), Error> {
        let values = patch
            .into_values()
            .into_iter()
            .map(|(key, value)| Ok((key.as_str(), serde_json::to_string(&value)?)))
            .collect::<Result<Vec<_>, Error>>()?;
        if values.is_empty() {
            return Ok(());
        }

        self.db
            .conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                for (key, value) in &values {
                    tx.execute(
                        "INSERT INTO metadata (key, value) VALUES (?1, ?2)
                        ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                        params![key, value],
                    )?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}
