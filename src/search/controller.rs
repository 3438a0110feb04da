//! Debounced search controller.
//!
//! Owns the raw query string typed by the user and publishes a debounced
//! copy once input has settled. Exactly one timer is pending at any time:
//! every keystroke aborts the previous timer task and schedules a fresh
//! one, so a burst of edits produces a single dependent fetch.

use super::recent::RecentSearches;
use crate::catalog_store::{EntityKind, SqliteCatalogStore, StoreError};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_SEARCH_LIMIT: usize = 20;
/// The dependent fetch only fires once the debounced query is longer than
/// one character.
pub const MIN_QUERY_CHARS: usize = 2;

/// Seam between the controller and the query layer, so tests can count and
/// fake fetches.
pub trait SearchBackend: Send + Sync {
    fn search_by_name(
        &self,
        query: &str,
        kind: EntityKind,
        limit: usize,
    ) -> Result<Vec<Value>, StoreError>;
}

impl SearchBackend for SqliteCatalogStore {
    fn search_by_name(
        &self,
        query: &str,
        kind: EntityKind,
        limit: usize,
    ) -> Result<Vec<Value>, StoreError> {
        SqliteCatalogStore::search_by_name(self, query, kind, limit)
    }
}

/// Results of the latest committed fetch, tagged with the query that issued
/// them. A stale arrival (tag no longer matching the debounced value) is
/// never published.
#[derive(Clone, Debug, Default)]
pub struct SearchResults {
    pub query: String,
    pub hits: Vec<Value>,
    pub error: Option<String>,
}

pub struct SearchController {
    backend: Arc<dyn SearchBackend>,
    recent: RecentSearches,
    kinds: Vec<EntityKind>,
    limit: usize,
    delay: Duration,
    raw_query: String,
    pending: Option<JoinHandle<()>>,
    debounced_tx: watch::Sender<String>,
    results_tx: watch::Sender<SearchResults>,
}

impl SearchController {
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        recent: RecentSearches,
        kinds: Vec<EntityKind>,
        limit: usize,
        delay: Duration,
    ) -> Self {
        let (debounced_tx, _) = watch::channel(String::new());
        let (results_tx, _) = watch::channel(SearchResults::default());
        SearchController {
            backend,
            recent,
            kinds,
            limit,
            delay,
            raw_query: String::new(),
            pending: None,
            debounced_tx,
            results_tx,
        }
    }

    /// The raw, un-debounced query string.
    pub fn query(&self) -> &str {
        &self.raw_query
    }

    /// Watch the debounced query value.
    pub fn debounced(&self) -> watch::Receiver<String> {
        self.debounced_tx.subscribe()
    }

    /// Watch the committed search results.
    pub fn results(&self) -> watch::Receiver<SearchResults> {
        self.results_tx.subscribe()
    }

    /// Record a new raw query value. Cancels the pending debounce timer (if
    /// any) and starts a fresh one; the debounced value and the dependent
    /// fetch only materialize once the timer runs out undisturbed.
    pub fn set_query(&mut self, query: &str) {
        self.raw_query = query.to_string();

        if let Some(pending) = self.pending.take() {
            pending.abort();
        }

        let delay = self.delay;
        let query = self.raw_query.clone();
        let backend = self.backend.clone();
        let kinds = self.kinds.clone();
        let limit = self.limit;
        let debounced_tx = self.debounced_tx.clone();
        let results_tx = self.results_tx.clone();

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            debounced_tx.send_replace(query.clone());

            if query.trim().chars().count() < MIN_QUERY_CHARS {
                results_tx.send_replace(SearchResults {
                    query,
                    hits: Vec::new(),
                    error: None,
                });
                return;
            }

            let fetch = {
                let query = query.clone();
                tokio::task::spawn_blocking(move || {
                    let mut hits = Vec::new();
                    let mut error = None;
                    for kind in kinds {
                        match backend.search_by_name(&query, kind, limit) {
                            Ok(mut rows) => hits.append(&mut rows),
                            Err(e) => {
                                warn!("Search for {} failed: {}", kind.as_str(), e);
                                error = Some(e.to_string());
                            }
                        }
                    }
                    (hits, error)
                })
            };

            let (hits, error) = match fetch.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("Search fetch died: {}", e);
                    (Vec::new(), Some(e.to_string()))
                }
            };

            // Discard a stale arrival: a newer keystroke has already moved
            // the debounced value on.
            if *debounced_tx.borrow() == query {
                results_tx.send_replace(SearchResults { query, hits, error });
            }
        }));
    }

    /// Persist a query into the recents list (blank input is a no-op).
    pub fn save_recent(&self, query: &str) {
        self.recent.save(query);
    }

    /// The persisted recents, most recent first; corrupt state degrades to
    /// empty.
    pub fn recent_searches(&self) -> Vec<String> {
        self.recent.get()
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}
