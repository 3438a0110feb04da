mod error;
mod models;
mod query;
mod schema;
mod store;

pub use error::StoreError;
pub use models::*;
pub use query::{ListQuery, PageWindow, SortState, TrackFilters, TrackTableQuery};
pub use schema::CATALOG_VERSIONED_SCHEMAS;
pub use store::SqliteCatalogStore;
