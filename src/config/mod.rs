mod file_config;

pub use file_config::FileConfig;

use anyhow::{bail, Result};
use std::path::PathBuf;
use std::time::Duration;

/// CLI arguments eligible for config-file override. Mirrors the flags the
/// binary accepts.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub catalog_db: Option<PathBuf>,
    pub state_db: Option<PathBuf>,
    pub search_debounce_ms: u64,
    pub search_limit: usize,
    pub track_page_size: usize,
    pub connection_page_size: usize,
    pub overscan: usize,
    pub read_pool_size: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            catalog_db: None,
            state_db: None,
            search_debounce_ms: 300,
            search_limit: 20,
            track_page_size: 25,
            connection_page_size: 10,
            overscan: 5,
            read_pool_size: 4,
        }
    }
}

/// Resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub catalog_db: PathBuf,
    pub state_db: PathBuf,
    pub search_debounce: Duration,
    pub search_limit: usize,
    pub track_page_size: usize,
    pub connection_page_size: usize,
    pub overscan: usize,
    pub read_pool_size: usize,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and an optional TOML file.
    /// File values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let catalog_db = file
            .catalog_db
            .map(PathBuf::from)
            .or_else(|| cli.catalog_db.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("catalog_db must be specified via --catalog-db or in config file")
            })?;

        if let Some(parent) = catalog_db.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                bail!("Catalog database directory does not exist: {:?}", parent);
            }
        }

        // The state db defaults to a sibling of the catalog db.
        let state_db = file
            .state_db
            .map(PathBuf::from)
            .or_else(|| cli.state_db.clone())
            .unwrap_or_else(|| catalog_db.with_file_name("browser-state.db"));

        let search_debounce_ms = file.search_debounce_ms.unwrap_or(cli.search_debounce_ms);
        let search_limit = file.search_limit.unwrap_or(cli.search_limit);
        let track_page_size = file.track_page_size.unwrap_or(cli.track_page_size);
        let connection_page_size = file
            .connection_page_size
            .unwrap_or(cli.connection_page_size);
        let overscan = file.overscan.unwrap_or(cli.overscan);
        let read_pool_size = file.read_pool_size.unwrap_or(cli.read_pool_size).max(1);

        if track_page_size == 0 || connection_page_size == 0 {
            bail!("Page sizes must be greater than zero");
        }

        Ok(AppConfig {
            catalog_db,
            state_db,
            search_debounce: Duration::from_millis(search_debounce_ms),
            search_limit,
            track_page_size,
            connection_page_size,
            overscan,
            read_pool_size,
        })
    }
}
