//! SQLite schema for the producer credits catalog.
//!
//! Primary keys are integer rowids with unique text IDs for lookups, so
//! joins stay on integers while the public API speaks external IDs.
//! Metadata bags are stored as JSON text columns.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
};

// =============================================================================
// Core Tables
// =============================================================================

/// Producers table
const PRODUCERS_TABLE: Table = Table {
    name: "producers",
    columns: &[
        sqlite_column!("rowid", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("id", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("handle", &SqlType::Text),
        sqlite_column!("contact_email", &SqlType::Text),
        sqlite_column!("metadata", &SqlType::Text), // JSON bag: image_url, genres, ...
    ],
    indices: &[("idx_producers_name", "name")],
};

/// Artists table
const ARTISTS_TABLE: Table = Table {
    name: "artists",
    columns: &[
        sqlite_column!("rowid", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("id", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("followers_total", &SqlType::Integer),
        sqlite_column!("popularity", &SqlType::Integer),
        sqlite_column!("metadata", &SqlType::Text), // JSON bag: image_url, genres, ...
    ],
    indices: &[("idx_artists_name", "name")],
};

const ALBUM_ARTIST_FK: ForeignKey = ForeignKey {
    foreign_table: "artists",
    foreign_column: "rowid",
    on_delete: ForeignKeyOnChange::Cascade,
};

/// Albums table. Each album belongs to exactly one artist.
const ALBUMS_TABLE: Table = Table {
    name: "albums",
    columns: &[
        sqlite_column!("rowid", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("id", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("release_date", &SqlType::Integer, non_null = true), // unix seconds, UTC
        sqlite_column!(
            "artist_rowid",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ALBUM_ARTIST_FK)
        ),
    ],
    indices: &[
        ("idx_albums_artist", "artist_rowid"),
        ("idx_albums_release_date", "release_date"),
        ("idx_albums_name", "name"),
    ],
};

const TRACK_ALBUM_FK: ForeignKey = ForeignKey {
    foreign_table: "albums",
    foreign_column: "rowid",
    on_delete: ForeignKeyOnChange::Cascade,
};

/// Tracks table. Each track belongs to exactly one album.
const TRACKS_TABLE: Table = Table {
    name: "tracks",
    columns: &[
        sqlite_column!("rowid", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("id", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!(
            "album_rowid",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&TRACK_ALBUM_FK)
        ),
    ],
    indices: &[
        ("idx_tracks_album", "album_rowid"),
        ("idx_tracks_name", "name"),
    ],
};

// =============================================================================
// Junction Tables
// =============================================================================

const CREDIT_TRACK_FK: ForeignKey = ForeignKey {
    foreign_table: "tracks",
    foreign_column: "rowid",
    on_delete: ForeignKeyOnChange::Cascade,
};

const CREDIT_PRODUCER_FK: ForeignKey = ForeignKey {
    foreign_table: "producers",
    foreign_column: "rowid",
    on_delete: ForeignKeyOnChange::Cascade,
};

/// Credits: Track <-> Producer join records. A track may carry several
/// credits and a producer appears on many tracks.
const CREDITS_TABLE: Table = Table {
    name: "credits",
    columns: &[
        sqlite_column!("rowid", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("id", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!(
            "track_rowid",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&CREDIT_TRACK_FK)
        ),
        sqlite_column!(
            "producer_rowid",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&CREDIT_PRODUCER_FK)
        ),
    ],
    indices: &[
        ("idx_credits_track", "track_rowid"),
        ("idx_credits_producer", "producer_rowid"),
    ],
};

// =============================================================================
// Versioned Schema Definition
// =============================================================================

pub const CATALOG_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        PRODUCERS_TABLE,
        ARTISTS_TABLE,
        ALBUMS_TABLE,
        TRACKS_TABLE,
        CREDITS_TABLE,
    ],
    migration: None,
}];
