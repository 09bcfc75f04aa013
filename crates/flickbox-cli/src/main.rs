use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use flickbox_catalog::{CachedCatalog, DiscoverFilters, TmdbClient};
use flickbox_config::{resolve_api_key, Config, CredentialStore, Paths};
use flickbox_models::MediaType;
use flickbox_store::{JsonFileStorage, Watchlist, WatchlistStore};

use commands::{browse, config, watchlist};
use commands::watchlist::ExportFormat;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "flickbox")]
#[command(about = "Flickbox - browse the movie catalog and keep a watchlist")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show this week's trending titles
    Trending {
        /// TV shows instead of movies
        #[arg(long, action = ArgAction::SetTrue)]
        tv: bool,
    },
    /// Show popular movies
    Popular,
    /// Show top rated titles
    TopRated {
        /// TV shows instead of movies
        #[arg(long, action = ArgAction::SetTrue)]
        tv: bool,
    },
    /// Search the catalog
    Search {
        query: String,

        /// Search TV shows instead of movies
        #[arg(long, action = ArgAction::SetTrue, conflicts_with = "multi")]
        tv: bool,

        /// Search movies and TV shows together
        #[arg(long, action = ArgAction::SetTrue)]
        multi: bool,

        /// Result page to fetch
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Discover titles by genre, year, and rating
    Discover {
        /// TV shows instead of movies
        #[arg(long, action = ArgAction::SetTrue)]
        tv: bool,

        /// Genre ids to match (e.g. --genres 28,12)
        #[arg(long, value_delimiter = ',')]
        genres: Vec<i64>,

        /// Sort key (defaults to popularity.desc)
        #[arg(long)]
        sort_by: Option<String>,

        /// Result page to fetch
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Release year (movies) or first air year (TV)
        #[arg(long)]
        year: Option<u32>,

        /// Minimum vote average
        #[arg(long)]
        rating: Option<f64>,
    },
    /// List catalog genres
    Genres {
        /// Restrict to one catalog: movie or tv (default: both, merged)
        #[arg(long, value_enum)]
        r#type: Option<GenreKind>,
    },
    /// Show full details for one title
    Details {
        id: i64,

        /// Treat the id as a TV show
        #[arg(long, action = ArgAction::SetTrue)]
        tv: bool,
    },
    /// Manage your watchlist
    Watchlist {
        #[command(subcommand)]
        cmd: WatchlistCommands,
    },
    /// Configure the TMDB API key and settings
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum GenreKind {
    Movie,
    Tv,
}

#[derive(Subcommand)]
enum WatchlistCommands {
    /// Show the watchlist, newest first
    List {
        /// Only watched titles
        #[arg(long, action = ArgAction::SetTrue, conflicts_with = "unwatched")]
        watched: bool,

        /// Only unwatched titles
        #[arg(long, action = ArgAction::SetTrue)]
        unwatched: bool,
    },
    /// Add a title by catalog id (fetches a snapshot of its details)
    Add {
        id: i64,

        /// Treat the id as a TV show
        #[arg(long, action = ArgAction::SetTrue)]
        tv: bool,
    },
    /// Remove a title
    Remove {
        id: i64,

        /// Treat the id as a TV show
        #[arg(long, action = ArgAction::SetTrue)]
        tv: bool,
    },
    /// Toggle a title between watched and unwatched
    Watched {
        id: i64,

        /// Treat the id as a TV show
        #[arg(long, action = ArgAction::SetTrue)]
        tv: bool,
    },
    /// Remove every title
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, action = ArgAction::SetTrue)]
        yes: bool,
    },
    /// Export the watchlist
    Export {
        #[arg(long, default_value = "json", value_enum)]
        format: ExportFormat,

        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration (masks the API key)
    Show,
    /// Store the TMDB API key
    Key {
        /// The key; prompted without echo when omitted
        #[arg(long)]
        key: Option<String>,
    },
    /// Remove stored credentials
    Clear,
}

fn media_type(tv: bool) -> MediaType {
    if tv {
        MediaType::Tv
    } else {
        MediaType::Movie
    }
}

/// One watchlist handle per process, opened from the persisted slot and
/// passed to every command that needs it.
fn open_watchlist(paths: &Paths) -> Result<Watchlist> {
    paths
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create data directories: {}", e))?;
    let storage = JsonFileStorage::new(paths.watchlist_file());
    tracing::debug!("Watchlist slot: {:?}", paths.watchlist_file());
    Ok(Watchlist::new(WatchlistStore::open(Box::new(storage))))
}

fn build_catalog(paths: &Paths, config: &Config) -> Result<CachedCatalog<TmdbClient>> {
    let mut store = CredentialStore::new(paths.credentials_file());
    store
        .load()
        .map_err(|e| eyre!("Failed to load credentials: {}", e))?;
    let api_key = resolve_api_key(&store).ok_or_else(|| {
        eyre!("No TMDB API key configured. Set TMDB_API_KEY or run `flickbox config key`.")
    })?;

    let client = TmdbClient::with_base_url(api_key, config.catalog.base_url.clone());
    Ok(CachedCatalog::new(
        client,
        Duration::from_secs(config.cache.list_ttl_minutes * 60),
        Duration::from_secs(config.cache.genre_ttl_hours * 3600),
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    logging::init_logging(cli.verbose, cli.quiet).map_err(|e| eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);
    let paths = Paths::default();
    let config = Config::load(&paths.config_file()).map_err(|e| eyre!("{}", e))?;

    match cli.command {
        Commands::Trending { tv } => {
            let catalog = build_catalog(&paths, &config)?;
            browse::run_trending(&catalog, tv, &output).await
        }
        Commands::Popular => {
            let catalog = build_catalog(&paths, &config)?;
            browse::run_popular(&catalog, &output).await
        }
        Commands::TopRated { tv } => {
            let catalog = build_catalog(&paths, &config)?;
            browse::run_top_rated(&catalog, tv, &output).await
        }
        Commands::Search {
            query,
            tv,
            multi,
            page,
        } => {
            let catalog = build_catalog(&paths, &config)?;
            browse::run_search(&catalog, &query, tv, multi, page, &output).await
        }
        Commands::Discover {
            tv,
            genres,
            sort_by,
            page,
            year,
            rating,
        } => {
            let catalog = build_catalog(&paths, &config)?;
            let filters = DiscoverFilters {
                genres,
                sort_by,
                page,
                year,
                min_rating: rating,
            };
            browse::run_discover(&catalog, media_type(tv), filters, &output).await
        }
        Commands::Genres { r#type } => {
            let catalog = build_catalog(&paths, &config)?;
            let media_type = r#type.map(|kind| match kind {
                GenreKind::Movie => MediaType::Movie,
                GenreKind::Tv => MediaType::Tv,
            });
            browse::run_genres(&catalog, media_type, &output).await
        }
        Commands::Details { id, tv } => {
            let catalog = build_catalog(&paths, &config)?;
            browse::run_details(&catalog, id, media_type(tv), &output).await
        }
        Commands::Watchlist { cmd } => {
            let list = open_watchlist(&paths)?;
            match cmd {
                WatchlistCommands::List { watched, unwatched } => {
                    let filter = match (watched, unwatched) {
                        (true, _) => Some(true),
                        (_, true) => Some(false),
                        _ => None,
                    };
                    watchlist::run_list(&list, filter, &output)
                }
                WatchlistCommands::Add { id, tv } => {
                    let catalog = build_catalog(&paths, &config)?;
                    watchlist::run_add(&catalog, &list, id, media_type(tv), &output).await
                }
                WatchlistCommands::Remove { id, tv } => {
                    watchlist::run_remove(&list, id, media_type(tv), &output)
                }
                WatchlistCommands::Watched { id, tv } => {
                    watchlist::run_watched(&list, id, media_type(tv), &output)
                }
                WatchlistCommands::Clear { yes } => watchlist::run_clear(&list, yes, &output),
                WatchlistCommands::Export { format, out } => {
                    watchlist::run_export(&list, format, out, &output)
                }
            }
        }
        Commands::Config { cmd } => {
            let cmd = cmd.unwrap_or(ConfigCommands::Show);
            match cmd {
                ConfigCommands::Show => config::run_show(&paths, &config, &output),
                ConfigCommands::Key { key } => config::run_key(&paths, key, &output),
                ConfigCommands::Clear => config::run_clear(&paths, &output),
            }
        }
    }
}
