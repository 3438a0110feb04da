//! Query parameter types shared by the store and the browse coordinator.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TRACK_PAGE_SIZE: usize = 25;

// =============================================================================
// Pagination
// =============================================================================

/// Row window for a 1-indexed page: `start = (page-1)*page_size`,
/// `end = start + page_size - 1`. Applied as LIMIT/OFFSET; an empty page is
/// not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub start: usize,
    pub end: usize,
}

impl PageWindow {
    pub fn new(page: usize, page_size: usize) -> Self {
        let page = page.max(1);
        let page_size = page_size.max(1);
        let start = (page - 1) * page_size;
        PageWindow {
            start,
            end: start + page_size - 1,
        }
    }

    pub fn offset(&self) -> usize {
        self.start
    }

    pub fn limit(&self) -> usize {
        self.end - self.start + 1
    }
}

// =============================================================================
// Ordering
// =============================================================================

/// Sort column and direction. `column` may be a dot-separated nested path
/// (e.g. `album.release_date`) which the store routes to the corresponding
/// joined table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: String,
    pub ascending: bool,
}

impl SortState {
    pub fn descending(column: impl Into<String>) -> Self {
        SortState {
            column: column.into(),
            ascending: false,
        }
    }

    fn direction_sql(&self) -> &'static str {
        if self.ascending {
            "ASC"
        } else {
            "DESC"
        }
    }
}

/// Route a track-table sort path to the joined column it refers to.
/// Unknown paths are rejected so user input never reaches the SQL text.
pub(crate) fn resolve_track_sort_column(path: &str) -> Option<&'static str> {
    match path {
        "name" | "track.name" => Some("t.name"),
        "album.name" => Some("al.name"),
        "release_date" | "album.release_date" => Some("al.release_date"),
        "artist.name" => Some("ar.name"),
        _ => None,
    }
}

/// ORDER BY clause for the producer track table. Absent or unknown sort
/// columns fall back to album release date descending.
pub(crate) fn track_order_clause(sort: Option<&SortState>) -> String {
    match sort.and_then(|s| resolve_track_sort_column(&s.column).map(|c| (c, s))) {
        Some((column, sort)) => format!("{} {}", column, sort.direction_sql()),
        None => "al.release_date DESC".to_string(),
    }
}

// =============================================================================
// Filters
// =============================================================================

/// Filter set for a producer's track table. All dimensions are independent
/// and combined with AND; an absent value means "no constraint".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackFilters {
    pub year: Option<i32>,
    pub artist_id: Option<String>,
    pub album_id: Option<String>,
}

impl TrackFilters {
    pub fn is_empty(&self) -> bool {
        self.year.is_none() && self.artist_id.is_none() && self.album_id.is_none()
    }
}

/// Half-open `[Jan 1 year, Jan 1 year+1)` in unix seconds, UTC.
/// Returns `None` for years outside chrono's representable range.
pub(crate) fn year_bounds_utc(year: i32) -> Option<(i64, i64)> {
    Some((year_start_utc(year)?, year_start_utc(year.checked_add(1)?)?))
}

fn year_start_utc(year: i32) -> Option<i64> {
    let midnight = NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)?;
    Some(midnight.and_utc().timestamp())
}

// =============================================================================
// Query envelopes
// =============================================================================

/// Full parameter tuple for one producer-track-table fetch. Equality on this
/// struct is what identifies a stale response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackTableQuery {
    pub page: usize,
    pub page_size: usize,
    pub sort: Option<SortState>,
    pub filters: TrackFilters,
}

impl Default for TrackTableQuery {
    fn default() -> Self {
        TrackTableQuery {
            page: 1,
            page_size: DEFAULT_TRACK_PAGE_SIZE,
            sort: None,
            filters: TrackFilters::default(),
        }
    }
}

impl TrackTableQuery {
    pub fn window(&self) -> PageWindow {
        PageWindow::new(self.page, self.page_size)
    }
}

/// Parameters for a generic filtered/sorted/paginated entity list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListQuery {
    pub page: usize,
    pub page_size: usize,
    pub order_by: Option<SortState>,
    /// Equality filters, ANDed. Columns outside the per-kind whitelist are
    /// rejected by the store.
    pub filters: Vec<(String, String)>,
}

impl ListQuery {
    pub fn page(page: usize, page_size: usize) -> Self {
        ListQuery {
            page,
            page_size,
            order_by: None,
            filters: Vec::new(),
        }
    }

    /// Add an equality filter; a `None` value is omitted entirely.
    pub fn with_filter(mut self, column: impl Into<String>, value: Option<String>) -> Self {
        if let Some(value) = value {
            self.filters.push((column.into(), value));
        }
        self
    }

    pub fn with_order(mut self, order_by: SortState) -> Self {
        self.order_by = Some(order_by);
        self
    }

    pub fn window(&self) -> PageWindow {
        PageWindow::new(self.page, self.page_size)
    }
}
