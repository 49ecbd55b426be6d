//! Schema versioning for the session database.
//!
//! Applied versions are recorded in `schema_version`; each pending script
//! runs in its own transaction together with its version row.

use tokio_rusqlite::{Connection, params};

use crate::Error;

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration { version: 1, name: "metadata", sql: include_str!("../../migrations/001_metadata.sql") },
    Migration { version: 2, name: "session_record", sql: include_str!("../../migrations/002_session_record.sql") },
];

/// Highest version this build knows how to apply.
pub fn latest_version() -> i64 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Bring the schema up to [`latest_version`]. Returns how many scripts ran.
pub async fn run(conn: &Connection) -> Result<usize, Error> {
    conn.call(|conn| -> Result<usize, Error> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL
            )",
        )?;

        let applied: i64 =
            conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |row| row.get(0))?;

        let mut ran = 0;
        for migration in MIGRATIONS.iter().filter(|m| m.version > applied) {
            let tx = conn.transaction()?;
            tx.execute_batch(migration.sql)
                .map_err(|e| Error::MigrationFailed(format!("{} ({}): {e}", migration.name, migration.version)))?;
            tx.execute(
                "INSERT INTO schema_version (version, name, applied_at) VALUES (?1, ?2, ?3)",
                params![migration.version, migration.name, chrono::Utc::now().to_rfc3339()],
            )?;
            tx.commit()?;

            tracing::debug!(version = migration.version, name = migration.name, "applied migration");
            ran += 1;
        }

        Ok(ran)
    })
    .await
    .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn table_exists(conn: &Connection, table: &'static str) -> bool {
        conn.call(move |conn| {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1)",
                [table],
                |row| row.get(0),
            )
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_fresh_database_gets_every_table() {
        let conn = Connection::open_in_memory().await.unwrap();

        assert_eq!(run(&conn).await.unwrap(), MIGRATIONS.len());
        assert!(table_exists(&conn, "metadata").await);
        assert!(table_exists(&conn, "session_record").await);
    }

    #[tokio::test]
    async fn test_rerun_applies_nothing() {
        let conn = Connection::open_in_memory().await.unwrap();
        run(&conn).await.unwrap();

        assert_eq!(run(&conn).await.unwrap(), 0);

        let version: i64 = conn
            .call(|conn| conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0)))
            .await
            .unwrap();
        assert_eq!(version, latest_version());
    }

    #[tokio::test]
    async fn test_resumes_from_recorded_version() {
        let conn = Connection::open_in_memory().await.unwrap();
        conn.call(|conn| {
            conn.execute_batch(MIGRATIONS[0].sql)?;
            conn.execute_batch(
                "CREATE TABLE schema_version (version INTEGER PRIMARY KEY, name TEXT NOT NULL, applied_at TEXT NOT NULL);
                 INSERT INTO schema_version VALUES (1, 'metadata', '2025-12-11T00:00:00Z');",
            )
        })
        .await
        .unwrap();

        assert_eq!(run(&conn).await.unwrap(), 1);
        assert!(table_exists(&conn, "session_record").await);
    }
}
