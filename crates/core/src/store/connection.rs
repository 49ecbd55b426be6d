//! Opening the session database.
//!
//! Both stores share one connection; opening applies WAL pragmas and brings
//! the schema up to date before either store sees it.

use super::migrations;
use crate::Error;
use std::path::Path;
use tokio_rusqlite::Connection;

const PRAGMAS: &str = "PRAGMA journal_mode=WAL;
     PRAGMA synchronous=NORMAL;
     PRAGMA temp_store=MEMORY;
     PRAGMA foreign_keys=ON;";

/// Session database handle. Clones share the underlying connection thread.
#[derive(Clone, Debug)]
pub struct SessionDb {
    pub(crate) conn: Connection,
}

impl SessionDb {
    /// Open (or create) the database file at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    /// Private in-memory database, gone when the last clone drops.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, Error> {
        conn.call(|conn| {
            conn.execute_batch(PRAGMAS)?;
            Ok(())
        })
        .await
        .map_err(Error::Database)?;

        let ran = migrations::run(&conn).await?;
        if ran > 0 {
            tracing::info!(ran, version = migrations::latest_version(), "session schema migrated");
        }

        Ok(Self { conn })
    }
}
