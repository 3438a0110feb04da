//! Fire-and-forget write side effects.
//!
//! The browsing core is read-only except for two narrow operations consumed
//! as black boxes: enqueuing a named discovery job and invoking a scheduling
//! procedure. Neither outcome feeds back into core state; success or failure
//! is only surfaced to the user through the `Notifier` boundary (the toast
//! layer lives outside this crate).

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};
use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

pub const DISCOVERY_JOB_NAME: &str = "artist_discovery";

/// Toast boundary. The view layer decides how a message is shown.
pub trait Notifier: Send + Sync {
    fn notify_info(&self, message: &str);
    fn notify_error(&self, message: &str);
}

/// Default notifier: structured logs only.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify_info(&self, message: &str) {
        info!("{}", message);
    }

    fn notify_error(&self, message: &str) {
        warn!("{}", message);
    }
}

/// Black-box scheduling procedure invoked by name.
pub trait ScheduleProcedure: Send + Sync {
    fn invoke(&self, name: &str) -> Result<()>;
}

/// Stand-in used when no scheduler backend is wired up.
pub struct NoopScheduleProcedure;

impl ScheduleProcedure for NoopScheduleProcedure {
    fn invoke(&self, name: &str) -> Result<()> {
        info!("Schedule procedure '{}' invoked (noop)", name);
        Ok(())
    }
}

const DISCOVERY_JOBS_TABLE: Table = Table {
    name: "discovery_jobs",
    columns: &[
        sqlite_column!("rowid", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("id", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("job_name", &SqlType::Text, non_null = true),
        sqlite_column!("payload", &SqlType::Text, non_null = true),
        sqlite_column!("created_at", &SqlType::Integer, non_null = true),
    ],
    indices: &[("idx_discovery_jobs_name", "job_name")],
};

pub const JOBS_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[DISCOVERY_JOBS_TABLE],
    migration: None,
}];

/// Queue for discovery jobs picked up by the external pipeline.
#[derive(Clone)]
pub struct DiscoveryQueue {
    conn: Arc<Mutex<Connection>>,
}

impl DiscoveryQueue {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path.as_ref()).context("Failed to open jobs database")?;

        let table_exists: bool = conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type='table' AND name='discovery_jobs'",
                [],
                |_| Ok(true),
            )
            .unwrap_or(false);
        if !table_exists {
            info!("Creating discovery jobs schema");
            for table in JOBS_VERSIONED_SCHEMAS[JOBS_VERSIONED_SCHEMAS.len() - 1].tables {
                table.create(&conn)?;
            }
        }

        Ok(DiscoveryQueue {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Enqueue a named job with a payload. Fire-and-forget: the outcome is
    /// reported through the notifier and nothing else depends on it.
    pub fn enqueue_discovery(&self, notifier: &dyn Notifier, artist_name: &str, payload: &Value) {
        let job_id = Uuid::new_v4().to_string();
        let result = {
            let conn = self.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO discovery_jobs (id, job_name, payload, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    job_id,
                    DISCOVERY_JOB_NAME,
                    payload.to_string(),
                    chrono::Utc::now().timestamp(),
                ],
            )
        };
        match result {
            Ok(_) => notifier.notify_info(&format!("Discovery queued for '{}'", artist_name)),
            Err(e) => notifier.notify_error(&format!(
                "Failed to queue discovery for '{}': {}",
                artist_name, e
            )),
        }
    }

    /// Number of queued jobs, for the queue monitor boundary.
    pub fn pending_count(&self) -> usize {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM discovery_jobs", [], |r| {
            r.get::<_, i64>(0)
        })
        .unwrap_or(0) as usize
    }
}

/// Invoke a named scheduling procedure, reporting the outcome as a toast.
pub fn invoke_refresh_schedule(
    procedure: &dyn ScheduleProcedure,
    notifier: &dyn Notifier,
    name: &str,
) {
    match procedure.invoke(name) {
        Ok(()) => notifier.notify_info(&format!("Schedule '{}' invoked", name)),
        Err(e) => notifier.notify_error(&format!("Schedule '{}' failed: {}", name, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Default)]
    struct RecordingNotifier {
        infos: Mutex<Vec<String>>,
        errors: Mutex<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify_info(&self, message: &str) {
            self.infos.lock().unwrap().push(message.to_string());
        }

        fn notify_error(&self, message: &str) {
            self.errors.lock().unwrap().push(message.to_string());
        }
    }

    #[test]
    fn enqueue_inserts_a_row_and_toasts_success() {
        let dir = tempfile::tempdir().unwrap();
        let queue = DiscoveryQueue::new(dir.path().join("jobs.db")).unwrap();
        let notifier = RecordingNotifier::default();

        queue.enqueue_discovery(&notifier, "Metro Boomin", &json!({"artist": "Metro Boomin"}));

        assert_eq!(queue.pending_count(), 1);
        assert_eq!(notifier.infos.lock().unwrap().len(), 1);
        assert!(notifier.errors.lock().unwrap().is_empty());
    }

    #[test]
    fn schedule_failure_reports_through_the_notifier_only() {
        struct FailingProcedure;
        impl ScheduleProcedure for FailingProcedure {
            fn invoke(&self, _name: &str) -> Result<()> {
                anyhow::bail!("scheduler offline")
            }
        }

        let notifier = RecordingNotifier::default();
        invoke_refresh_schedule(&FailingProcedure, &notifier, "refresh-credits");

        let errors = notifier.errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("scheduler offline"));
    }
}
