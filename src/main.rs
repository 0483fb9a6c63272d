use anyhow::{Context, Result};
use car_catalog::car_manager::CarManager;
use car_catalog::config::{AppConfig, CliConfig, FileConfig};
use car_catalog::results::FsResultsSource;
use car_catalog::search::SearchContext;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(name = "car-catalog", about = "Browse and maintain the cars of a game server install")]
struct CliArgs {
    /// Path to a TOML config file. Values in the file override CLI flags.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Root of the server install (the directory containing `content/cars`).
    #[clap(long, value_parser = parse_path)]
    pub install_path: Option<PathBuf>,

    /// Path to the search index database. Defaults to `<install>/search-index/cars.db`.
    #[clap(long, value_parser = parse_path)]
    pub index_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lists every car in the catalog.
    List,

    /// Shows one car as JSON.
    Show { car: String },

    /// Searches the catalog. Without a term every car is listed.
    Search {
        term: Option<String>,

        /// Zero-based results page.
        #[clap(long, default_value_t = 0)]
        page: usize,

        /// Abort the search after this many milliseconds.
        #[clap(long)]
        timeout_ms: Option<u64>,
    },

    /// Rebuilds the search index from the catalog on disk.
    RebuildIndex,

    /// Adds a tag to a car.
    AddTag { car: String, tag: String },

    /// Removes a tag from a car, if present.
    RemoveTag { car: String, tag: String },

    /// Sets the operator-maintained fields of a car.
    SetMetadata {
        car: String,

        #[clap(long, default_value = "")]
        download_url: String,

        #[clap(long, default_value = "")]
        notes: String,
    },

    /// Deletes a car from disk and from the search index.
    Delete { car: String },

    /// Shows the session results a car took part in.
    Results { car: String },
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(command: Command, config: &AppConfig, manager: &CarManager) -> Result<()> {
    match command {
        Command::List => {
            for car in manager.list_cars(None)? {
                println!("{}\t{}\t{} skins", car.name, car.display_name(), car.skins.len());
            }
        }
        Command::Show { car } => {
            let car = manager
                .load_car(&car, None)
                .with_context(|| format!("Failed to load car {}", car))?;
            print_json(&car)?;
        }
        Command::Search {
            term,
            page,
            timeout_ms,
        } => {
            let token = CancellationToken::new();
            let handler_token = token.clone();
            ctrlc::set_handler(move || handler_token.cancel())
                .context("Failed to install Ctrl-C handler")?;

            let mut ctx = SearchContext::with_token(token);
            let timeout = timeout_ms
                .map(std::time::Duration::from_millis)
                .or(config.search_timeout);
            if let Some(timeout) = timeout {
                ctx = ctx.with_timeout(timeout);
            }

            let term = term.unwrap_or_default();
            let results = manager.search(&term, page, &ctx)?;
            println!(
                "{} hits, page {} of {}",
                results.total_hits,
                results.page + 1,
                results.num_pages.max(1)
            );
            for car in results.ordered_cars() {
                println!("{}\t{}", car.name, car.display_name());
            }
        }
        Command::RebuildIndex => {
            let count = manager.rebuild_index()?;
            println!("Indexed {} cars", count);
        }
        Command::AddTag { car, tag } => {
            let car = manager.add_tag(&car, &tag)?;
            println!("{}: {}", car.name, car.details.tags().join(", "));
        }
        Command::RemoveTag { car, tag } => {
            let car = manager.remove_tag(&car, &tag)?;
            println!("{}: {}", car.name, car.details.tags().join(", "));
        }
        Command::SetMetadata {
            car,
            download_url,
            notes,
        } => {
            let car = manager.update_car_metadata(&car, &download_url, &notes)?;
            println!("Updated {}", car.name);
        }
        Command::Delete { car } => {
            if manager.delete_car(&car)? {
                println!("Deleted {}", car);
            } else {
                println!("No car named {}, removed from the index only", car);
            }
        }
        Command::Results { car } => {
            let source = FsResultsSource::new(config.results_dir());
            print_json(&manager.results_for_car(&car, &source)?)?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let cli_config = CliConfig {
        install_path: cli_args.install_path.clone(),
        search_index_path: cli_args.index_path.clone(),
        search_timeout_ms: None,
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    info!(
        "Opening car catalog at {:?} with search index {:?}",
        config.install_path, config.search_index_path
    );
    let manager = CarManager::open(&config.install_path, &config.search_index_path)
        .context("Failed to open car catalog")?;

    let result = run(cli_args.command, &config, &manager);
    manager.close().context("Failed to close search index")?;
    result
}
