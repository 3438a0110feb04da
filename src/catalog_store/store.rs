//! SQLite-backed catalog store.
//!
//! All reads go through a small round-robin pool of read-only connections;
//! writes (the narrow import surface) share one write connection. Boundary
//! operations return `StoreError` so callers always get an explicit outcome.

use super::error::StoreError;
use super::models::*;
use super::query::{
    track_order_clause, year_bounds_utc, ListQuery, PageWindow, SortState, TrackTableQuery,
};
use super::schema::CATALOG_VERSIONED_SCHEMAS;
use crate::connections::{fold_connections, Connected};
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{Context, Result};
use futures::future::join_all;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// SQLite-backed catalog store for producer credits metadata.
#[derive(Clone)]
pub struct SqliteCatalogStore {
    read_pool: Vec<Arc<Mutex<Connection>>>,
    write_conn: Arc<Mutex<Connection>>,
    read_index: Arc<AtomicUsize>,
}

fn migrate_if_needed(conn: &mut Connection) -> Result<()> {
    let latest_version = CATALOG_VERSIONED_SCHEMAS.len() - 1;
    let latest_schema = &CATALOG_VERSIONED_SCHEMAS[latest_version];

    let table_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
            [],
            |r| r.get(0),
        )
        .unwrap_or(0);

    if table_count == 0 {
        info!("Creating catalog db schema at version {}", latest_version);
        latest_schema.create(conn)?;
        return Ok(());
    }

    let db_version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    let mut current_version = (db_version - BASE_DB_VERSION as i64).max(0) as usize;
    if current_version >= latest_version {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for schema in CATALOG_VERSIONED_SCHEMAS.iter().skip(current_version + 1) {
        if let Some(migration_fn) = schema.migration {
            info!(
                "Migrating catalog db from version {} to {}",
                current_version, schema.version
            );
            migration_fn(&tx)?;
            current_version = schema.version;
        }
    }
    tx.pragma_update(None, "user_version", BASE_DB_VERSION + current_version)?;
    tx.commit()?;
    Ok(())
}

/// Escape LIKE wildcards so a user query only ever matches as a literal
/// substring. The pattern is used with `ESCAPE '\'`.
fn escape_like(query: &str) -> String {
    query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Per-kind configuration for the generic list operation: base SELECT,
/// equality-filter whitelist (column name -> predicate) and sortable-column
/// whitelist (public name -> SQL column).
struct ListSpec {
    select: &'static str,
    filters: &'static [(&'static str, &'static str)],
    sort_columns: &'static [(&'static str, &'static str)],
}

const PRODUCER_LIST: ListSpec = ListSpec {
    select: "SELECT id, name, handle, contact_email, metadata FROM producers",
    filters: &[],
    sort_columns: &[("name", "name")],
};

const ARTIST_LIST: ListSpec = ListSpec {
    select: "SELECT id, name, followers_total, popularity, metadata FROM artists",
    filters: &[],
    sort_columns: &[
        ("name", "name"),
        ("popularity", "popularity"),
        ("followers_total", "followers_total"),
    ],
};

const ALBUM_LIST: ListSpec = ListSpec {
    select: "SELECT al.id, al.name, al.release_date, ar.id \
             FROM albums al INNER JOIN artists ar ON ar.rowid = al.artist_rowid",
    filters: &[("artist_id", "ar.id = ?")],
    sort_columns: &[("name", "al.name"), ("release_date", "al.release_date")],
};

const TRACK_LIST: ListSpec = ListSpec {
    select: "SELECT t.id, t.name, al.id \
             FROM tracks t INNER JOIN albums al ON al.rowid = t.album_rowid",
    filters: &[("album_id", "al.id = ?")],
    sort_columns: &[("name", "t.name")],
};

fn list_spec(kind: EntityKind) -> &'static ListSpec {
    match kind {
        EntityKind::Producer => &PRODUCER_LIST,
        EntityKind::Artist => &ARTIST_LIST,
        EntityKind::Album => &ALBUM_LIST,
        EntityKind::Track => &TRACK_LIST,
    }
}

impl SqliteCatalogStore {
    /// Open (and create/migrate if needed) a catalog database.
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file
    /// * `read_pool_size` - Number of connections for concurrent reads
    pub fn new<P: AsRef<Path>>(db_path: P, read_pool_size: usize) -> Result<Self> {
        let db_path_ref = db_path.as_ref();

        let mut write_conn = Connection::open_with_flags(
            db_path_ref,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .context("Failed to open catalog database")?;

        migrate_if_needed(&mut write_conn)?;
        write_conn.pragma_update(None, "journal_mode", "WAL")?;

        #[cfg(not(feature = "no_checks"))]
        CATALOG_VERSIONED_SCHEMAS[CATALOG_VERSIONED_SCHEMAS.len() - 1]
            .validate(&write_conn)
            .context("Catalog schema validation failed")?;

        let producer_count: i64 = write_conn
            .query_row("SELECT COUNT(*) FROM producers", [], |r| r.get(0))
            .unwrap_or(0);
        let artist_count: i64 = write_conn
            .query_row("SELECT COUNT(*) FROM artists", [], |r| r.get(0))
            .unwrap_or(0);
        let track_count: i64 = write_conn
            .query_row("SELECT COUNT(*) FROM tracks", [], |r| r.get(0))
            .unwrap_or(0);

        info!(
            "Opened catalog: {} producers, {} artists, {} tracks",
            producer_count, artist_count, track_count
        );

        let mut read_pool = Vec::with_capacity(read_pool_size.max(1));
        for _ in 0..read_pool_size.max(1) {
            let read_conn = Connection::open_with_flags(
                db_path_ref,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            read_conn.pragma_update(None, "journal_mode", "WAL")?;
            read_pool.push(Arc::new(Mutex::new(read_conn)));
        }

        Ok(SqliteCatalogStore {
            write_conn: Arc::new(Mutex::new(write_conn)),
            read_pool,
            read_index: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn get_read_conn(&self) -> Arc<Mutex<Connection>> {
        let index = self.read_index.fetch_add(1, Ordering::SeqCst) % self.read_pool.len();
        self.read_pool[index].clone()
    }

    // =========================================================================
    // Internal Helper Methods
    // =========================================================================

    /// Resolve the rowid behind an external entity id.
    fn entity_rowid(conn: &Connection, table: &str, id: &str) -> Result<Option<i64>, StoreError> {
        match conn.query_row(
            &format!("SELECT rowid FROM {} WHERE id = ?1", table),
            params![id],
            |r| r.get(0),
        ) {
            Ok(rowid) => Ok(Some(rowid)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Parse a Producer from a row (id, name, handle, contact_email, metadata).
    fn parse_producer_row(row: &rusqlite::Row) -> rusqlite::Result<Producer> {
        Ok(Producer {
            id: row.get(0)?,
            name: row.get(1)?,
            handle: row.get(2)?,
            contact_email: row.get(3)?,
            metadata: EntityMetadata::from_db_json(row.get(4)?),
        })
    }

    /// Parse an Artist from a row (id, name, followers_total, popularity, metadata).
    fn parse_artist_row(row: &rusqlite::Row) -> rusqlite::Result<Artist> {
        Ok(Artist {
            id: row.get(0)?,
            name: row.get(1)?,
            followers_total: row.get(2)?,
            popularity: row.get(3)?,
            metadata: EntityMetadata::from_db_json(row.get(4)?),
        })
    }

    /// Parse an Album from a row (id, name, release_date, artist id).
    fn parse_album_row(row: &rusqlite::Row) -> rusqlite::Result<Album> {
        Ok(Album {
            id: row.get(0)?,
            name: row.get(1)?,
            release_date: row.get(2)?,
            artist_id: row.get(3)?,
        })
    }

    /// Parse a Track from a row (id, name, album id).
    fn parse_track_row(row: &rusqlite::Row) -> rusqlite::Result<Track> {
        Ok(Track {
            id: row.get(0)?,
            name: row.get(1)?,
            album_id: row.get(2)?,
        })
    }

    fn query_optional<T>(
        &self,
        sql: &str,
        id: &str,
        parse: impl FnOnce(&rusqlite::Row) -> rusqlite::Result<T>,
    ) -> Result<Option<T>, StoreError> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(sql)?;
        match stmt.query_row(params![id], parse) {
            Ok(entity) => Ok(Some(entity)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // =========================================================================
    // Read Operations - Point Lookups
    // =========================================================================

    pub fn get_producer(&self, id: &str) -> Result<Option<Producer>, StoreError> {
        self.query_optional(
            "SELECT id, name, handle, contact_email, metadata FROM producers WHERE id = ?1",
            id,
            Self::parse_producer_row,
        )
    }

    pub fn get_artist(&self, id: &str) -> Result<Option<Artist>, StoreError> {
        self.query_optional(
            "SELECT id, name, followers_total, popularity, metadata FROM artists WHERE id = ?1",
            id,
            Self::parse_artist_row,
        )
    }

    pub fn get_album(&self, id: &str) -> Result<Option<Album>, StoreError> {
        self.query_optional(
            "SELECT al.id, al.name, al.release_date, ar.id
             FROM albums al INNER JOIN artists ar ON ar.rowid = al.artist_rowid
             WHERE al.id = ?1",
            id,
            Self::parse_album_row,
        )
    }

    pub fn get_track(&self, id: &str) -> Result<Option<Track>, StoreError> {
        self.query_optional(
            "SELECT t.id, t.name, al.id
             FROM tracks t INNER JOIN albums al ON al.rowid = t.album_rowid
             WHERE t.id = ?1",
            id,
            Self::parse_track_row,
        )
    }

    /// Number of credits attributed to a producer. Derived per call, never
    /// stored.
    pub fn producer_credit_count(&self, producer_id: &str) -> Result<usize, StoreError> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();

        let producer_rowid = Self::entity_rowid(&conn, "producers", producer_id)?
            .ok_or(StoreError::NotFound)?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM credits WHERE producer_rowid = ?1",
            params![producer_rowid],
            |r| r.get(0),
        )?;
        Ok(count as usize)
    }

    /// Producer together with its derived credit count.
    pub fn get_resolved_producer(
        &self,
        id: &str,
    ) -> Result<Option<ResolvedProducer>, StoreError> {
        let producer = match self.get_producer(id)? {
            Some(p) => p,
            None => return Ok(None),
        };
        let track_count = self.producer_credit_count(id)?;
        Ok(Some(ResolvedProducer {
            producer,
            track_count,
        }))
    }

    /// Point lookup by kind and primary key. Zero rows is `NotFound`.
    pub fn fetch_one(&self, kind: EntityKind, id: &str) -> Result<Value, StoreError> {
        let value = match kind {
            EntityKind::Producer => self.get_producer(id)?.map(to_json).transpose()?,
            EntityKind::Artist => self.get_artist(id)?.map(to_json).transpose()?,
            EntityKind::Album => self.get_album(id)?.map(to_json).transpose()?,
            EntityKind::Track => self.get_track(id)?.map(to_json).transpose()?,
        };
        value.ok_or(StoreError::NotFound)
    }

    // =========================================================================
    // Read Operations - Lists
    // =========================================================================

    /// Filtered/sorted/paginated entity list. Equality filters are ANDed;
    /// the page window is always applied; an empty page yields an empty list.
    pub fn fetch_list(&self, kind: EntityKind, query: &ListQuery) -> Result<Vec<Value>, StoreError> {
        let spec = list_spec(kind);

        let mut clauses: Vec<&'static str> = Vec::new();
        let mut bind_values: Vec<SqlValue> = Vec::new();
        for (column, value) in &query.filters {
            let predicate = spec
                .filters
                .iter()
                .find(|(name, _)| *name == column.as_str())
                .map(|(_, predicate)| *predicate)
                .ok_or_else(|| {
                    StoreError::QueryFailed(format!(
                        "unsupported filter column '{}' for {}",
                        column,
                        kind.as_str()
                    ))
                })?;
            clauses.push(predicate);
            bind_values.push(SqlValue::Text(value.clone()));
        }

        let mut sql = spec.select.to_string();
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        if let Some(order_by) = &query.order_by {
            match spec
                .sort_columns
                .iter()
                .find(|(name, _)| *name == order_by.column)
            {
                Some((_, sql_column)) => {
                    sql.push_str(&format!(
                        " ORDER BY {} {}",
                        sql_column,
                        if order_by.ascending { "ASC" } else { "DESC" }
                    ));
                }
                None => {
                    // Store-defined order rather than an error for a column
                    // the view layer should not have offered.
                    warn!(
                        "Ignoring unsupported sort column '{}' for {}",
                        order_by.column,
                        kind.as_str()
                    );
                }
            }
        }

        let window = query.window();
        sql.push_str(" LIMIT ? OFFSET ?");
        bind_values.push(SqlValue::Integer(window.limit() as i64));
        bind_values.push(SqlValue::Integer(window.offset() as i64));

        match kind {
            EntityKind::Producer => self.collect_rows(&sql, bind_values, Self::parse_producer_row),
            EntityKind::Artist => self.collect_rows(&sql, bind_values, Self::parse_artist_row),
            EntityKind::Album => self.collect_rows(&sql, bind_values, Self::parse_album_row),
            EntityKind::Track => self.collect_rows(&sql, bind_values, Self::parse_track_row),
        }
    }

    fn collect_rows<T: Serialize>(
        &self,
        sql: &str,
        bind_values: Vec<SqlValue>,
        parse: fn(&rusqlite::Row) -> rusqlite::Result<T>,
    ) -> Result<Vec<Value>, StoreError> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(sql)?;
        let entities = stmt
            .query_map(params_from_iter(bind_values), parse)?
            .collect::<Result<Vec<T>, _>>()?;
        entities
            .into_iter()
            .map(|entity| serde_json::to_value(entity).map_err(Into::into))
            .collect()
    }

    // =========================================================================
    // Read Operations - Producer Track Table
    // =========================================================================

    /// Paginated credits for a producer with the Track -> Album -> Artist
    /// chain joined in. Year filters are half-open ranges on the album
    /// release date; nested sort paths are routed to the joined tables.
    pub fn producer_track_credits(
        &self,
        producer_id: &str,
        query: &TrackTableQuery,
    ) -> Result<Vec<ResolvedCredit>, StoreError> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();

        let producer_rowid = Self::entity_rowid(&conn, "producers", producer_id)?
            .ok_or(StoreError::NotFound)?;

        let mut clauses = vec!["c.producer_rowid = ?".to_string()];
        let mut bind_values: Vec<SqlValue> = vec![SqlValue::Integer(producer_rowid)];

        if let Some(year) = query.filters.year {
            match year_bounds_utc(year) {
                Some((start, end)) => {
                    clauses.push("al.release_date >= ? AND al.release_date < ?".to_string());
                    bind_values.push(SqlValue::Integer(start));
                    bind_values.push(SqlValue::Integer(end));
                }
                None => {
                    // Out of chrono's range; nothing can match.
                    clauses.push("0 = 1".to_string());
                }
            }
        }
        if let Some(artist_id) = &query.filters.artist_id {
            clauses.push("ar.id = ?".to_string());
            bind_values.push(SqlValue::Text(artist_id.clone()));
        }
        if let Some(album_id) = &query.filters.album_id {
            clauses.push("al.id = ?".to_string());
            bind_values.push(SqlValue::Text(album_id.clone()));
        }

        let window = query.window();
        let sql = format!(
            "SELECT c.id, t.id, t.name, al.id, al.name, al.release_date,
                    ar.id, ar.name, ar.followers_total, ar.popularity, ar.metadata
             FROM credits c
             INNER JOIN tracks t ON t.rowid = c.track_rowid
             INNER JOIN albums al ON al.rowid = t.album_rowid
             INNER JOIN artists ar ON ar.rowid = al.artist_rowid
             WHERE {}
             ORDER BY {}
             LIMIT ? OFFSET ?",
            clauses.join(" AND "),
            track_order_clause(query.sort.as_ref()),
        );
        bind_values.push(SqlValue::Integer(window.limit() as i64));
        bind_values.push(SqlValue::Integer(window.offset() as i64));

        let mut stmt = conn.prepare_cached(&sql)?;
        let credits = stmt
            .query_map(params_from_iter(bind_values), |row| {
                let album_id: String = row.get(3)?;
                let artist_id: String = row.get(6)?;
                Ok(ResolvedCredit {
                    credit_id: row.get(0)?,
                    track: Track {
                        id: row.get(1)?,
                        name: row.get(2)?,
                        album_id: album_id.clone(),
                    },
                    album: Album {
                        id: album_id,
                        name: row.get(4)?,
                        release_date: row.get(5)?,
                        artist_id: artist_id.clone(),
                    },
                    artist: Artist {
                        id: artist_id,
                        name: row.get(7)?,
                        followers_total: row.get(8)?,
                        popularity: row.get(9)?,
                        metadata: EntityMetadata::from_db_json(row.get(10)?),
                    },
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(credits)
    }

    // =========================================================================
    // Read Operations - Artist Connections
    // =========================================================================

    /// Producers connected to an artist, one entry per distinct producer
    /// with the number of contributing credits, sorted by that count
    /// descending. Pagination happens at the album level; the fold itself is
    /// client-side (`connections::fold_connections`).
    pub fn artist_producers(
        &self,
        artist_id: &str,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<Connected<Producer>>, StoreError> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();

        let artist_rowid =
            Self::entity_rowid(&conn, "artists", artist_id)?.ok_or(StoreError::NotFound)?;

        let window = PageWindow::new(page, page_size);
        let mut albums_stmt = conn.prepare_cached(
            "SELECT rowid FROM albums WHERE artist_rowid = ?1
             ORDER BY release_date DESC
             LIMIT ?2 OFFSET ?3",
        )?;
        let album_rowids: Vec<i64> = albums_stmt
            .query_map(
                params![artist_rowid, window.limit() as i64, window.offset() as i64],
                |r| r.get(0),
            )?
            .collect::<Result<Vec<_>, _>>()?;

        if album_rowids.is_empty() {
            return Ok(Vec::new());
        }

        // LEFT JOINs keep tracks whose credit chain does not resolve; the
        // fold drops those rows instead of crashing on them.
        let placeholders = vec!["?"; album_rowids.len()].join(", ");
        let sql = format!(
            "SELECT p.id, p.name, p.handle, p.contact_email, p.metadata
             FROM tracks t
             LEFT JOIN credits c ON c.track_rowid = t.rowid
             LEFT JOIN producers p ON p.rowid = c.producer_rowid
             WHERE t.album_rowid IN ({})
             ORDER BY t.rowid, c.rowid",
            placeholders
        );
        let mut stmt = conn.prepare_cached(&sql)?;
        let bind_values: Vec<SqlValue> =
            album_rowids.into_iter().map(SqlValue::Integer).collect();
        let rows: Vec<Option<Producer>> = stmt
            .query_map(params_from_iter(bind_values), |row| {
                let id: Option<String> = row.get(0)?;
                match id {
                    Some(id) => Ok(Some(Producer {
                        id,
                        name: row.get(1)?,
                        handle: row.get(2)?,
                        contact_email: row.get(3)?,
                        metadata: EntityMetadata::from_db_json(row.get(4)?),
                    })),
                    None => Ok(None),
                }
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(fold_connections(rows))
    }

    // =========================================================================
    // Read Operations - Search
    // =========================================================================

    /// Case-insensitive substring match on `name`, bounded by `limit`.
    /// An empty or whitespace-only query is answered without touching the
    /// database.
    pub fn search_by_name(
        &self,
        query: &str,
        kind: EntityKind,
        limit: usize,
    ) -> Result<Vec<Value>, StoreError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let table = match kind {
            EntityKind::Producer => "producers",
            EntityKind::Artist => "artists",
            EntityKind::Album => "albums",
            EntityKind::Track => "tracks",
        };
        let pattern = format!("%{}%", escape_like(query));

        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT id, name FROM {}
             WHERE name LIKE ?1 ESCAPE '\\' COLLATE NOCASE
             ORDER BY name ASC
             LIMIT ?2",
            table
        ))?;

        let results = stmt
            .query_map(params![pattern, limit as i64], |row| {
                Ok(json!({
                    "kind": kind.as_str(),
                    "id": row.get::<_, String>(0)?,
                    "name": row.get::<_, String>(1)?,
                }))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(results)
    }

    /// Fan out one substring search per requested kind, concurrently.
    /// A failing sub-search degrades to an empty list for that kind.
    pub async fn search_across(
        &self,
        query: &str,
        kinds: &[EntityKind],
        limit: usize,
    ) -> HashMap<EntityKind, Vec<Value>> {
        let tasks: Vec<_> = kinds
            .iter()
            .map(|&kind| {
                let store = self.clone();
                let query = query.to_string();
                tokio::task::spawn_blocking(move || store.search_by_name(&query, kind, limit))
            })
            .collect();

        let mut results = HashMap::new();
        for (&kind, joined) in kinds.iter().zip(join_all(tasks).await) {
            let rows = match joined {
                Ok(Ok(rows)) => rows,
                Ok(Err(e)) => {
                    warn!("Search for {} failed: {}", kind.as_str(), e);
                    Vec::new()
                }
                Err(e) => {
                    warn!("Search task for {} died: {}", kind.as_str(), e);
                    Vec::new()
                }
            };
            results.insert(kind, rows);
        }
        results
    }

    // =========================================================================
    // Read Operations - Counts
    // =========================================================================

    fn count_table(&self, table: &str) -> usize {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| {
            r.get::<_, i64>(0)
        })
        .unwrap_or(0) as usize
    }

    /// Row counts for producers/artists/tracks, issued concurrently.
    /// A failed count degrades to 0, never an error for the whole call.
    pub async fn database_stats(&self) -> CatalogStats {
        let count = |table: &'static str| {
            let store = self.clone();
            async move {
                tokio::task::spawn_blocking(move || store.count_table(table))
                    .await
                    .unwrap_or_else(|e| {
                        warn!("Count of {} died: {}", table, e);
                        0
                    })
            }
        };
        let (producers, artists, tracks) =
            tokio::join!(count("producers"), count("artists"), count("tracks"));
        CatalogStats {
            producers,
            artists,
            tracks,
        }
    }

    // =========================================================================
    // Write Operations - Import Surface
    // =========================================================================

    pub fn insert_producer(&self, producer: &Producer) -> Result<(), StoreError> {
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "INSERT INTO producers (id, name, handle, contact_email, metadata)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                producer.id,
                producer.name,
                producer.handle,
                producer.contact_email,
                producer.metadata.as_ref().map(|m| m.to_db_json()),
            ],
        )?;
        Ok(())
    }

    pub fn insert_artist(&self, artist: &Artist) -> Result<(), StoreError> {
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "INSERT INTO artists (id, name, followers_total, popularity, metadata)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                artist.id,
                artist.name,
                artist.followers_total,
                artist.popularity,
                artist.metadata.as_ref().map(|m| m.to_db_json()),
            ],
        )?;
        Ok(())
    }

    pub fn insert_album(&self, album: &Album) -> Result<(), StoreError> {
        let conn = self.write_conn.lock().unwrap();
        let artist_rowid = Self::entity_rowid(&conn, "artists", &album.artist_id)?
            .ok_or_else(|| {
                StoreError::QueryFailed(format!("unknown artist '{}'", album.artist_id))
            })?;
        conn.execute(
            "INSERT INTO albums (id, name, release_date, artist_rowid) VALUES (?1, ?2, ?3, ?4)",
            params![album.id, album.name, album.release_date, artist_rowid],
        )?;
        Ok(())
    }

    pub fn insert_track(&self, track: &Track) -> Result<(), StoreError> {
        let conn = self.write_conn.lock().unwrap();
        let album_rowid = Self::entity_rowid(&conn, "albums", &track.album_id)?
            .ok_or_else(|| StoreError::QueryFailed(format!("unknown album '{}'", track.album_id)))?;
        conn.execute(
            "INSERT INTO tracks (id, name, album_rowid) VALUES (?1, ?2, ?3)",
            params![track.id, track.name, album_rowid],
        )?;
        Ok(())
    }

    pub fn insert_credit(&self, credit: &Credit) -> Result<(), StoreError> {
        let conn = self.write_conn.lock().unwrap();
        let track_rowid = Self::entity_rowid(&conn, "tracks", &credit.track_id)?
            .ok_or_else(|| StoreError::QueryFailed(format!("unknown track '{}'", credit.track_id)))?;
        let producer_rowid = Self::entity_rowid(&conn, "producers", &credit.producer_id)?
            .ok_or_else(|| {
                StoreError::QueryFailed(format!("unknown producer '{}'", credit.producer_id))
            })?;
        conn.execute(
            "INSERT INTO credits (id, track_rowid, producer_rowid) VALUES (?1, ?2, ?3)",
            params![credit.id, track_rowid, producer_rowid],
        )?;
        Ok(())
    }

    /// Default ordering used by views that don't override it.
    pub fn default_track_sort() -> SortState {
        SortState::descending("album.release_date")
    }
}

fn to_json<T: Serialize>(entity: T) -> Result<Value, serde_json::Error> {
    serde_json::to_value(entity)
}
