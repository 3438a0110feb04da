//! Table browse state: pagination, ordering and filters for a tabular view,
//! plus stale-response discard.
//!
//! Every transition leaves the whole parameter tuple consistent before a
//! snapshot is taken for the next fetch: changing a filter or sort always
//! lands the view back on page 1 in the same synchronous step.

use crate::catalog_store::{SortState, TrackFilters, TrackTableQuery};
use serde::Serialize;

/// One filter dimension of the track table. A `None` payload clears the
/// dimension.
#[derive(Clone, Debug, PartialEq)]
pub enum TrackFilter {
    Year(Option<i32>),
    ArtistId(Option<String>),
    AlbumId(Option<String>),
}

/// Outcome of applying a fetch result against the current query snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Applied {
    /// The result matched the current parameters and replaced the rows.
    Committed,
    /// The result belonged to superseded parameters and was dropped.
    Stale,
}

/// Paged table state for one view. `T` is the row type (resolved credits for
/// the producer track table, connection tallies for the producers-of-artist
/// view).
#[derive(Debug)]
pub struct PagedTable<T> {
    query: TrackTableQuery,
    rows: Vec<T>,
    /// Row count of the last committed fetch; `None` until the first commit.
    last_fetch_len: Option<usize>,
    loading: bool,
}

impl<T> PagedTable<T> {
    pub fn new(page_size: usize) -> Self {
        PagedTable {
            query: TrackTableQuery {
                page_size,
                ..TrackTableQuery::default()
            },
            rows: Vec::new(),
            last_fetch_len: None,
            loading: false,
        }
    }

    /// The parameter tuple a fetch should be issued with. Results must be
    /// applied back with this exact snapshot.
    pub fn snapshot(&self) -> TrackTableQuery {
        self.query.clone()
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn page(&self) -> usize {
        self.query.page
    }

    pub fn sort(&self) -> Option<&SortState> {
        self.query.sort.as_ref()
    }

    pub fn filters(&self) -> &TrackFilters {
        &self.query.filters
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Merge one filter dimension and reset pagination to the first page.
    pub fn set_filter(&mut self, filter: TrackFilter) {
        match filter {
            TrackFilter::Year(year) => self.query.filters.year = year,
            TrackFilter::ArtistId(artist_id) => self.query.filters.artist_id = artist_id,
            TrackFilter::AlbumId(album_id) => self.query.filters.album_id = album_id,
        }
        self.query.page = 1;
    }

    /// Drop every filter and reset pagination to the first page.
    pub fn clear_filters(&mut self) {
        self.query.filters = TrackFilters::default();
        self.query.page = 1;
    }

    /// Re-selecting the current sort column flips its direction; selecting a
    /// new column starts it descending. Either way pagination resets.
    pub fn toggle_sort(&mut self, column: &str) {
        self.query.sort = match self.query.sort.take() {
            Some(sort) if sort.column == column => Some(SortState {
                ascending: !sort.ascending,
                ..sort
            }),
            _ => Some(SortState::descending(column)),
        };
        self.query.page = 1;
    }

    pub fn next_page(&mut self) {
        self.query.page += 1;
    }

    /// Decrements, floored at page 1.
    pub fn prev_page(&mut self) {
        self.query.page = self.query.page.saturating_sub(1).max(1);
    }

    /// Heuristic end-of-data signal: the last committed page came back short,
    /// so there is no further page to advance to.
    pub fn next_enabled(&self) -> bool {
        match self.last_fetch_len {
            Some(len) => len >= self.query.page_size,
            None => false,
        }
    }

    // =========================================================================
    // Fetch application
    // =========================================================================

    /// Apply a completed fetch. Results are keyed by the parameter tuple that
    /// issued them; anything issued against superseded parameters is
    /// discarded so a late arrival can never overwrite newer state.
    pub fn apply(&mut self, issued: &TrackTableQuery, rows: Vec<T>) -> Applied {
        if *issued != self.query {
            return Applied::Stale;
        }
        self.last_fetch_len = Some(rows.len());
        self.rows = rows;
        self.loading = false;
        Applied::Committed
    }
}
