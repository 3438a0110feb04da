use thiserror::Error;

/// Error taxonomy at the store boundary.
///
/// Every read operation returns `Result<_, StoreError>` rather than
/// panicking or leaking backend error types. `QueryFailed` carries the
/// SQLite diagnostic verbatim so the view layer can append it to its
/// inline error message.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Point lookup matched zero rows.
    #[error("not found")]
    NotFound,

    /// The store reported an error for a list/join/count operation.
    #[error("query failed: {0}")]
    QueryFailed(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
            other => StoreError::QueryFailed(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::QueryFailed(e.to_string())
    }
}
