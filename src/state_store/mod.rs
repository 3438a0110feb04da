//! Persisted key/value state.
//!
//! Small cross-session state (currently the recent-searches list) lives in
//! its own SQLite database as string keys mapping to string values. Writers
//! are serialized by the connection mutex, so read-modify-write sequences
//! performed under one call are atomic from the caller's perspective.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};
use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

const STATE_TABLE: Table = Table {
    name: "state",
    columns: &[
        sqlite_column!("key", &SqlType::Text, is_primary_key = true),
        sqlite_column!("value", &SqlType::Text, non_null = true),
    ],
    indices: &[],
};

pub const STATE_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[STATE_TABLE],
    migration: None,
}];

/// SQLite-backed key/value store for persisted browser state.
#[derive(Clone)]
pub struct SqliteStateStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStateStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path.as_ref()).context("Failed to open state database")?;

        let table_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
                [],
                |r| r.get(0),
            )
            .unwrap_or(0);
        if table_count == 0 {
            let latest = &STATE_VERSIONED_SCHEMAS[STATE_VERSIONED_SCHEMAS.len() - 1];
            info!("Creating state db schema at version {}", latest.version);
            latest.create(&conn)?;
        }

        #[cfg(not(feature = "no_checks"))]
        STATE_VERSIONED_SCHEMAS[STATE_VERSIONED_SCHEMAS.len() - 1]
            .validate(&conn)
            .context("State schema validation failed")?;

        Ok(SqliteStateStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn get_state(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        match conn.query_row(
            "SELECT value FROM state WHERE key = ?1",
            params![key],
            |r| r.get(0),
        ) {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set_state(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO state (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn delete_state(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM state WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, SqliteStateStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStateStore::new(dir.path().join("state.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn set_get_delete_round_trip() {
        let (_dir, store) = temp_store();
        assert_eq!(store.get_state("k").unwrap(), None);

        store.set_state("k", "v1").unwrap();
        assert_eq!(store.get_state("k").unwrap(), Some("v1".to_string()));

        store.set_state("k", "v2").unwrap();
        assert_eq!(store.get_state("k").unwrap(), Some("v2".to_string()));

        store.delete_state("k").unwrap();
        assert_eq!(store.get_state("k").unwrap(), None);
    }

    #[test]
    fn state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.db");
        {
            let store = SqliteStateStore::new(&path).unwrap();
            store.set_state("k", "persisted").unwrap();
        }
        let store = SqliteStateStore::new(&path).unwrap();
        assert_eq!(store.get_state("k").unwrap(), Some("persisted".to_string()));
    }
}
