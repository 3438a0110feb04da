mod controller;
mod recent;

pub use controller::{
    SearchBackend, SearchController, SearchResults, DEFAULT_SEARCH_DEBOUNCE, DEFAULT_SEARCH_LIMIT,
    MIN_QUERY_CHARS,
};
pub use recent::{RecentSearches, MAX_RECENT_SEARCHES, RECENT_SEARCHES_KEY};
