//! Price-Sweep main entry point
//!
//! This is the command-line interface for the Price-Sweep catalog crawler.

use anyhow::{bail, Context};
use clap::Parser;
use price_sweep::config::{load_config_with_hash, Config};
use price_sweep::crawler::crawl;
use price_sweep::output::{ensure_directory, export_path, print_statistics};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Price-Sweep: a catalog crawler that exports product prices
///
/// Price-Sweep starts at the catalog's listing page, follows links to every
/// product page on the same site and writes one CSV row per product to
/// `<output-dir>/<YYYY-MM-DD>.csv`.
#[derive(Parser, Debug)]
#[command(name = "price-sweep")]
#[command(version)]
#[command(about = "A catalog crawler that exports product prices", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Directory for the CSV export, overriding the configuration
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = load(cli.config.as_deref())?;
    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.display().to_string();
    }

    let output_dir = PathBuf::from(&config.output.directory);
    let destination = export_path(&output_dir, chrono::Local::now().date_naive());

    if cli.dry_run {
        handle_dry_run(&config, &destination);
        return Ok(());
    }

    handle_crawl(config, &output_dir, &destination, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("price_sweep=info,warn"),
            1 => EnvFilter::new("price_sweep=debug,info"),
            2 => EnvFilter::new("price_sweep=trace,debug"),
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

/// Loads the configuration file, or the built-in defaults without one
fn load(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::info!("No configuration file given, using built-in defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    Ok(config)
}

/// Handles the --dry-run mode: shows the resolved configuration
fn handle_dry_run(config: &Config, destination: &Path) {
    println!("=== Price-Sweep Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Seed path: {}", config.site.seed_path);
    println!("  Product pattern: {}", config.site.product_pattern);

    println!("\nSelectors:");
    for (field, selector) in [
        ("item-name", &config.selectors.item_name),
        ("price", &config.selectors.price),
        ("image", &config.selectors.image),
    ] {
        match &selector.attribute {
            Some(attribute) => println!("  {}: {} [{}]", field, selector.css, attribute),
            None => println!("  {}: {} (text)", field, selector.css),
        }
    }

    println!("\nCrawler Configuration:");
    println!("  Timeout: {}ms", config.crawler.timeout_ms);
    println!("  Retries: {}", config.crawler.retries);
    println!(
        "  Max concurrent fetches: {}",
        config.crawler.max_concurrent_fetches
    );
    match config.crawler.expected_products {
        Some(n) => println!("  Expected products: {}", n),
        None => println!("  Expected products: until the frontier is empty"),
    }

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nOutput: {}", destination.display());

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: Config,
    output_dir: &Path,
    destination: &Path,
    quiet: bool,
) -> anyhow::Result<()> {
    ensure_directory(output_dir)?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling crawl");
            on_interrupt.cancel();
        }
    });

    let outcome = match crawl(config, destination, cancel).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    if !quiet {
        print_statistics(&outcome.stats);
    }

    if !outcome.seed_fetched {
        bail!(
            "Could not reach the catalog; wrote an empty export to {}",
            destination.display()
        );
    }

    tracing::info!(
        "Wrote {} records to {}",
        outcome.records,
        destination.display()
    );
    Ok(())
}
