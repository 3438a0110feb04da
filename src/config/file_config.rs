//! Optional TOML configuration file.
//!
//! Every field is optional; values present in the file override CLI
//! arguments during `AppConfig::resolve`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Path to the SQLite catalog database.
    pub catalog_db: Option<String>,
    /// Path to the SQLite state database (recents, job queue).
    pub state_db: Option<String>,
    /// Search debounce window in milliseconds.
    pub search_debounce_ms: Option<u64>,
    /// Maximum results per search fetch.
    pub search_limit: Option<usize>,
    /// Page size of the producer track table.
    pub track_page_size: Option<usize>,
    /// Page size (in albums) of the connected-producers view.
    pub connection_page_size: Option<usize>,
    /// Rows rendered beyond each visible edge of a windowed list.
    pub overscan: Option<usize>,
    /// Read connection pool size for the catalog database.
    pub read_pool_size: Option<usize>,
}

impl FileConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file {:?}", path.as_ref()))?;
        toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {:?}", path.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_config() {
        let config: FileConfig = toml::from_str(
            r#"
            catalog_db = "/data/catalog.db"
            search_debounce_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(config.catalog_db.as_deref(), Some("/data/catalog.db"));
        assert_eq!(config.search_debounce_ms, Some(250));
        assert_eq!(config.track_page_size, None);
    }

    #[test]
    fn rejects_unknown_keys() {
        let result: Result<FileConfig, _> = toml::from_str("databaze = \"typo\"");
        assert!(result.is_err());
    }
}
