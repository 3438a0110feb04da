//! Catalog models for SQLite-backed storage.
//!
//! Entities are read-only from this layer's perspective: they are
//! constructed from query results and replaced wholesale on re-fetch.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Enumerations
// =============================================================================

/// Catalog entity kind, used by the generic fetch/search operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Producer,
    Artist,
    Album,
    Track,
}

impl EntityKind {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "producer" => Some(EntityKind::Producer),
            "artist" => Some(EntityKind::Artist),
            "album" => Some(EntityKind::Album),
            "track" => Some(EntityKind::Track),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Producer => "producer",
            EntityKind::Artist => "artist",
            EntityKind::Album => "album",
            EntityKind::Track => "track",
        }
    }
}

// =============================================================================
// Metadata
// =============================================================================

/// Free-form metadata bag attached to producers and artists.
///
/// Persisted as a single JSON text column. Known keys are typed; anything
/// else lands in `extra` so consumers never need runtime type probing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EntityMetadata {
    /// Parse the stored JSON column. A malformed value degrades to `None`,
    /// it never surfaces as an error.
    pub fn from_db_json(raw: Option<String>) -> Option<Self> {
        let raw = raw?;
        match serde_json::from_str(&raw) {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                tracing::warn!("Dropping malformed entity metadata: {}", e);
                None
            }
        }
    }

    pub fn to_db_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

// =============================================================================
// Core Entities
// =============================================================================

/// Producer entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Producer {
    pub id: String,
    pub name: String,
    pub handle: Option<String>,
    pub contact_email: Option<String>,
    pub metadata: Option<EntityMetadata>,
}

/// Artist entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub followers_total: Option<i64>,
    pub popularity: Option<i32>,
    pub metadata: Option<EntityMetadata>,
}

/// Album entity. Belongs to exactly one artist.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    /// Release date as unix seconds (UTC).
    pub release_date: i64,
    pub artist_id: String,
}

/// Track entity. Belongs to exactly one album.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub album_id: String,
}

/// Credit entity linking one track to one producer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Credit {
    pub id: String,
    pub track_id: String,
    pub producer_id: String,
}

// =============================================================================
// Resolved/Composite Types
// =============================================================================

/// A credit with its full Track -> Album -> Artist chain resolved.
///
/// This is the row actually paginated in a producer's track table; the
/// nested chain is read-only display data.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedCredit {
    pub credit_id: String,
    pub track: Track,
    pub album: Album,
    pub artist: Artist,
}

/// Producer with its derived credit count. The count is computed per fetch,
/// never stored.
#[derive(Clone, Debug, Serialize)]
pub struct ResolvedProducer {
    pub producer: Producer,
    pub track_count: usize,
}

/// Row counts across the catalog. Fan-out counts that fail degrade to 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub producers: usize,
    pub artists: usize,
    pub tracks: usize,
}
