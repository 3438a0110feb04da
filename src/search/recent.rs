//! Persisted recent-searches list.
//!
//! Stored as a JSON array of strings under a fixed state-store key. The
//! list is small: most-recent-first, case-sensitive dedup, capped at 5.
//! A missing or unreadable persisted value degrades to an empty list,
//! never an error.

use crate::state_store::SqliteStateStore;
use tracing::warn;

pub const RECENT_SEARCHES_KEY: &str = "recent_searches";
pub const MAX_RECENT_SEARCHES: usize = 5;

#[derive(Clone)]
pub struct RecentSearches {
    store: SqliteStateStore,
}

impl RecentSearches {
    pub fn new(store: SqliteStateStore) -> Self {
        RecentSearches { store }
    }

    /// The persisted list, most recent first.
    pub fn get(&self) -> Vec<String> {
        let raw = match self.store.get_state(RECENT_SEARCHES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read recent searches, starting empty: {}", e);
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(list) => list,
            Err(e) => {
                warn!("Recent searches state is unreadable, starting empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Push a query to the front of the list. Blank input is a no-op; an
    /// existing equal entry (case-sensitive) moves to the front instead of
    /// duplicating; the oldest entry falls off past the cap.
    pub fn save(&self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }

        let mut list = self.get();
        list.retain(|entry| entry != query);
        list.insert(0, query.to_string());
        list.truncate(MAX_RECENT_SEARCHES);

        let serialized = match serde_json::to_string(&list) {
            Ok(serialized) => serialized,
            Err(e) => {
                warn!("Failed to serialize recent searches: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set_state(RECENT_SEARCHES_KEY, &serialized) {
            warn!("Failed to persist recent searches: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_recent() -> (tempfile::TempDir, RecentSearches) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStateStore::new(dir.path().join("state.db")).unwrap();
        (dir, RecentSearches::new(store))
    }

    #[test]
    fn dedup_is_case_sensitive_and_most_recent_first() {
        let (_dir, recent) = temp_recent();
        recent.save("drake");
        recent.save("Drake");
        recent.save("drake");
        assert_eq!(recent.get(), vec!["drake".to_string(), "Drake".to_string()]);
    }

    #[test]
    fn sixth_distinct_save_evicts_the_oldest() {
        let (_dir, recent) = temp_recent();
        for query in ["one", "two", "three", "four", "five", "six"] {
            recent.save(query);
        }
        assert_eq!(
            recent.get(),
            vec!["six", "five", "four", "three", "two"]
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn blank_input_is_a_no_op() {
        let (_dir, recent) = temp_recent();
        recent.save("");
        recent.save("   ");
        assert!(recent.get().is_empty());
    }

    #[test]
    fn corrupt_persisted_state_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStateStore::new(dir.path().join("state.db")).unwrap();
        store.set_state(RECENT_SEARCHES_KEY, "{definitely not json").unwrap();

        let recent = RecentSearches::new(store);
        assert!(recent.get().is_empty());

        // A save after corruption starts a fresh list rather than erroring.
        recent.save("drake");
        assert_eq!(recent.get(), vec!["drake".to_string()]);
    }
}
