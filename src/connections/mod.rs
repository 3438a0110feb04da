//! Client-side aggregation of join rows into connection tallies.
//!
//! The store hands this module the anchor entity of every join row in
//! arrival order; the fold deduplicates by id, counts repeats, and orders
//! the result by count descending. It is a pure function of its input, with
//! no I/O, so the tie-break and idempotence properties are testable in
//! isolation.

use serde::Serialize;
use std::collections::HashMap;

/// An entity that can anchor a connection tally.
pub trait ConnectionAnchor {
    fn anchor_id(&self) -> &str;
}

impl ConnectionAnchor for crate::catalog_store::Producer {
    fn anchor_id(&self) -> &str {
        &self.id
    }
}

impl ConnectionAnchor for crate::catalog_store::Artist {
    fn anchor_id(&self) -> &str {
        &self.id
    }
}

/// An anchor entity annotated with the number of distinct contributing
/// credits within the folded window. Never persisted; rebuilt per fetch.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Connected<E> {
    #[serde(flatten)]
    pub entity: E,
    pub track_count: usize,
}

/// Fold join rows into one `Connected` entry per distinct anchor id.
///
/// First sight of an id inserts the entity with count 1; a repeat sight
/// increments the count. `None` rows (a chain that does not resolve to a
/// concrete anchor) are skipped. The result is sorted by count descending
/// with a stable sort, so ties keep first-seen order.
pub fn fold_connections<E: ConnectionAnchor>(
    rows: impl IntoIterator<Item = Option<E>>,
) -> Vec<Connected<E>> {
    let mut index_by_id: HashMap<String, usize> = HashMap::new();
    let mut tallies: Vec<Connected<E>> = Vec::new();

    for entity in rows.into_iter().flatten() {
        match index_by_id.get(entity.anchor_id()) {
            Some(&index) => tallies[index].track_count += 1,
            None => {
                index_by_id.insert(entity.anchor_id().to_string(), tallies.len());
                tallies.push(Connected {
                    entity,
                    track_count: 1,
                });
            }
        }
    }

    tallies.sort_by(|a, b| b.track_count.cmp(&a.track_count));
    tallies
}
