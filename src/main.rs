use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use producer_catalog::catalog_store::{
    EntityKind, SortState, SqliteCatalogStore, TrackFilters, TrackTableQuery,
};
use producer_catalog::config::{AppConfig, CliConfig, FileConfig};
use producer_catalog::jobs::{DiscoveryQueue, LogNotifier};
use producer_catalog::search::RecentSearches;
use producer_catalog::state_store::SqliteStateStore;
use serde_json::json;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[clap(name = "catalog-browser")]
struct CliArgs {
    /// Path to the SQLite catalog database file.
    #[clap(long, value_parser = parse_path)]
    catalog_db: Option<PathBuf>,

    /// Path to the SQLite state database (recent searches, job queue).
    /// Defaults to a sibling of the catalog database.
    #[clap(long, value_parser = parse_path)]
    state_db: Option<PathBuf>,

    /// Path to an optional TOML config file; file values override flags.
    #[clap(long)]
    config: Option<PathBuf>,

    /// Search debounce window in milliseconds.
    #[clap(long, default_value_t = 300)]
    search_debounce_ms: u64,

    /// Maximum results per search fetch.
    #[clap(long, default_value_t = 20)]
    search_limit: usize,

    /// Page size of the producer track table.
    #[clap(long, default_value_t = 25)]
    track_page_size: usize,

    /// Page size (in albums) of the connected-producers view.
    #[clap(long, default_value_t = 10)]
    connection_page_size: usize,

    /// Rows rendered beyond each visible edge of a windowed list.
    #[clap(long, default_value_t = 5)]
    overscan: usize,

    /// Read connection pool size for the catalog database.
    #[clap(long, default_value_t = 4)]
    read_pool_size: usize,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print catalog row counts.
    Stats,

    /// Search entities by name substring, across all kinds by default.
    Search {
        query: String,
        /// Restrict to one entity kind (producer|artist|album|track).
        #[clap(long)]
        kind: Option<String>,
    },

    /// List a producer's credits with the track/album/artist chain joined in.
    ProducerTracks {
        producer_id: String,
        #[clap(long, default_value_t = 1)]
        page: usize,
        /// Filter to albums released in this calendar year.
        #[clap(long)]
        year: Option<i32>,
        #[clap(long)]
        artist_id: Option<String>,
        #[clap(long)]
        album_id: Option<String>,
        /// Sort column; nested paths like album.release_date are routed to
        /// the joined table.
        #[clap(long)]
        sort: Option<String>,
        #[clap(long)]
        ascending: bool,
    },

    /// Producers connected to an artist, with credit counts.
    ArtistProducers {
        artist_id: String,
        #[clap(long, default_value_t = 1)]
        page: usize,
    },

    /// Show recent searches.
    Recent,

    /// Queue a discovery job for an artist.
    Discover { artist_name: String },
}

impl CliArgs {
    fn cli_config(&self) -> CliConfig {
        CliConfig {
            catalog_db: self.catalog_db.clone(),
            state_db: self.state_db.clone(),
            search_debounce_ms: self.search_debounce_ms,
            search_limit: self.search_limit,
            track_page_size: self.track_page_size,
            connection_page_size: self.connection_page_size,
            overscan: self.overscan,
            read_pool_size: self.read_pool_size,
        }
    }
}

const ALL_KINDS: [EntityKind; 4] = [
    EntityKind::Producer,
    EntityKind::Artist,
    EntityKind::Album,
    EntityKind::Track,
];

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.cli_config(), file_config)?;

    let store = SqliteCatalogStore::new(&config.catalog_db, config.read_pool_size)?;

    match cli_args.command {
        Command::Stats => {
            let stats = store.database_stats().await;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Search { query, kind } => {
            let kinds: Vec<EntityKind> = match kind {
                Some(raw) => match EntityKind::from_db_str(&raw) {
                    Some(kind) => vec![kind],
                    None => bail!("Unknown entity kind '{}'", raw),
                },
                None => ALL_KINDS.to_vec(),
            };
            let results = store
                .search_across(&query, &kinds, config.search_limit)
                .await;
            println!("{}", serde_json::to_string_pretty(&results)?);

            let state_store = SqliteStateStore::new(&config.state_db)?;
            RecentSearches::new(state_store).save(&query);
        }
        Command::ProducerTracks {
            producer_id,
            page,
            year,
            artist_id,
            album_id,
            sort,
            ascending,
        } => {
            let query = TrackTableQuery {
                page,
                page_size: config.track_page_size,
                sort: sort.map(|column| SortState { column, ascending }),
                filters: TrackFilters {
                    year,
                    artist_id,
                    album_id,
                },
            };
            let credits = store.producer_track_credits(&producer_id, &query)?;
            println!("{}", serde_json::to_string_pretty(&credits)?);
        }
        Command::ArtistProducers { artist_id, page } => {
            let producers =
                store.artist_producers(&artist_id, page, config.connection_page_size)?;
            println!("{}", serde_json::to_string_pretty(&producers)?);
        }
        Command::Recent => {
            let state_store = SqliteStateStore::new(&config.state_db)?;
            let recents = RecentSearches::new(state_store).get();
            println!("{}", serde_json::to_string_pretty(&recents)?);
        }
        Command::Discover { artist_name } => {
            let queue = DiscoveryQueue::new(&config.state_db)?;
            queue.enqueue_discovery(
                &LogNotifier,
                &artist_name,
                &json!({ "artist_name": artist_name }),
            );
        }
    }

    Ok(())
}
