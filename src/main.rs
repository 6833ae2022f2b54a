//! Shelf-Harvest main entry point
//!
//! This is the command-line interface for the Shelf-Harvest catalog mirror.

use anyhow::Context;
use clap::Parser;
use shelf_harvest::config::{load_config_with_hash, validate, Config};
use shelf_harvest::crawler::{probe, run_crawl};
use shelf_harvest::download::run_download;
use shelf_harvest::output::{
    load_statistics, print_crawl_report, print_download_report, print_statistics,
};
use shelf_harvest::storage::open_store;
use shelf_harvest::CollectionKey;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Shelf-Harvest: an incremental storefront catalog mirror
///
/// Shelf-Harvest walks a seller's or a keyword's search results page by page,
/// keeps a resumable checkpoint of every listing it finds, and downloads the
/// listing images with a bounded worker pool.
#[derive(Parser, Debug)]
#[command(name = "shelf-harvest")]
#[command(version)]
#[command(about = "An incremental storefront catalog mirror", long_about = None)]
struct Cli {
    /// Seller whose listings to harvest
    #[arg(long, required_unless_present_any = ["keyword", "probe"])]
    seller: Option<String>,

    /// Search keyword to harvest (combined with --seller when both are given)
    #[arg(long)]
    keyword: Option<String>,

    /// Storefront locale extension (com, de, co.uk, ...)
    #[arg(long)]
    extension: Option<String>,

    /// Listings per result page
    #[arg(long)]
    page_size: Option<u32>,

    /// Concurrent downloads
    #[arg(long)]
    workers: Option<usize>,

    /// Directory under which collection folders are created
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Download the assets of the persisted checkpoint instead of crawling
    #[arg(long, conflicts_with_all = ["stats", "probe", "fresh"])]
    download: bool,

    /// Show records per page from the checkpoint and exit
    #[arg(long, conflicts_with_all = ["download", "probe", "fresh"])]
    stats: bool,

    /// Start from page 1, replacing the previous checkpoint
    #[arg(long)]
    fresh: bool,

    /// Extract a single result page URL and print what was found
    #[arg(long, value_name = "URL", conflicts_with_all = ["download", "stats", "fresh"])]
    probe: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match load_configuration(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {:#}", e);
            return Err(e);
        }
    };

    if let Some(url) = &cli.probe {
        return handle_probe(&config, url).await;
    }

    let key = CollectionKey::new(cli.seller.as_deref(), cli.keyword.as_deref())
        .context("A seller or a keyword is required")?;

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_token.cancel();
        }
    });

    let result = if cli.stats {
        handle_stats(&config, &key)
    } else if cli.download {
        handle_download(&config, &key, cancel).await
    } else {
        handle_crawl(&config, key, cli.fresh, cancel).await
    };

    if let Err(e) = &result {
        tracing::error!("{:#}", e);
    }
    result
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shelf_harvest=info,warn"),
            1 => EnvFilter::new("shelf_harvest=debug,info"),
            2 => EnvFilter::new("shelf_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the optional config file and applies command-line overrides
fn load_configuration(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("reading {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(extension) = &cli.extension {
        config.site.extension = extension.clone();
    }
    if let Some(page_size) = cli.page_size {
        config.crawler.page_size = Some(page_size);
    }
    if let Some(workers) = cli.workers {
        config.download.workers = workers;
    }
    if let Some(dir) = &cli.output_dir {
        config.output.root = dir.to_string_lossy().into_owned();
    }

    validate(&config).context("invalid settings")?;
    Ok(config)
}

/// Handles the --probe mode: extracts one page and prints the first listings
async fn handle_probe(config: &Config, url: &str) -> anyhow::Result<()> {
    let listings = probe(config, url)
        .await
        .with_context(|| format!("probing {}", url))?;

    println!("=== Probe: {} ===\n", url);
    println!("Listings found: {}\n", listings.len());
    for listing in listings.iter().take(10) {
        println!("  id:    {}", listing.id.as_deref().unwrap_or("-"));
        println!("  name:  {}", listing.label.as_deref().unwrap_or("-"));
        println!("  image: {}\n", listing.asset_url);
    }
    Ok(())
}

/// Handles the --stats mode: shows records per page for the collection
fn handle_stats(config: &Config, key: &CollectionKey) -> anyhow::Result<()> {
    let store = open_store(&config.output);
    println!("Checkpoint: {}\n", store.checkpoint_path(key).display());

    let stats = load_statistics(&store, key, config.crawler.resume_policy)?;
    print_statistics(key, &stats);
    Ok(())
}

/// Handles the --download mode: fetches every asset in the checkpoint
async fn handle_download(
    config: &Config,
    key: &CollectionKey,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let report = run_download(config, key, cancel).await?;
    print_download_report(&report);
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: &Config,
    key: CollectionKey,
    fresh: bool,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh crawl (previous checkpoint will be replaced)");
    } else {
        tracing::info!("Starting crawl (resuming from checkpoint if present)");
    }

    let report = run_crawl(config, key, fresh, cancel).await?;
    print_crawl_report(&report);
    Ok(())
}
