//! Action Scraper main entry point
//!
//! This is the command-line interface for the presidential-actions archiver.

use action_scraper::config::{load_config_with_hash, validate, Config};
use action_scraper::crawler::Coordinator;
use action_scraper::output::print_statistics;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Action Scraper: a polite presidential-actions archiver
///
/// Walks the paginated listing of presidential actions, parses every detail
/// page and writes one JSON file per action to the output directory.
#[derive(Parser, Debug)]
#[command(name = "action-scraper")]
#[command(version)]
#[command(about = "A polite presidential-actions archiver", long_about = None)]
struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory receiving the JSON files
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<String>,

    /// URL of the first listing page
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Stop after this many listing pages
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Minimum time between requests in milliseconds
    #[arg(long, value_name = "MS")]
    min_interval: Option<u64>,

    /// List the detail pages that would be scraped without fetching them
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(config).await
    } else {
        handle_scrape(config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("action_scraper=info,warn"),
            1 => EnvFilter::new("action_scraper=debug,info"),
            2 => EnvFilter::new("action_scraper=trace,debug"),
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

/// Loads the configuration file if given, applies CLI overrides and validates
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.clone();
    }
    if let Some(url) = &cli.base_url {
        config.scraper.base_url = url.clone();
    }
    if let Some(max_pages) = cli.max_pages {
        config.scraper.max_pages = Some(max_pages);
    }
    if let Some(interval) = cli.min_interval {
        config.scraper.min_request_interval = interval;
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: paginates the listing and prints the targets
async fn handle_dry_run(config: Config) -> anyhow::Result<()> {
    println!("=== Action Scraper Dry Run ===\n");
    println!("Listing: {}", config.scraper.base_url);
    println!("Output: {}", config.output.directory);
    println!(
        "Pacing: {}ms between requests, {} attempts per URL\n",
        config.scraper.min_request_interval, config.scraper.max_attempts
    );

    let mut coordinator = Coordinator::new(config).context("Failed to initialize scraper")?;
    let targets = coordinator
        .discover()
        .await
        .context("Failed to read the listing")?;

    println!("Detail pages ({}):", targets.len());
    for target in &targets {
        println!("  - {} -> {}.json", target.url, target.identifier);
    }

    let stats = coordinator.stats();
    println!(
        "\n✓ {} listing pages, {} duplicate links skipped",
        stats.listing_pages, stats.duplicates
    );

    Ok(())
}

/// Handles the main scrape operation
async fn handle_scrape(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Scraping {} into {}",
        config.scraper.base_url,
        config.output.directory
    );

    let mut coordinator = Coordinator::new(config).context("Failed to initialize scraper")?;
    let stats = match coordinator.run().await {
        Ok(stats) => stats,
        Err(e) => {
            tracing::error!("Scrape failed: {}", e);
            return Err(e).context("Scrape aborted");
        }
    };

    println!();
    print_statistics(&stats);

    Ok(())
}
