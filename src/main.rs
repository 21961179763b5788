//! Crawl-Ledger main entry point
//!
//! This is the command-line interface for the Crawl-Ledger crawler.

use anyhow::Context;
use clap::Parser;
use crawl_ledger::config::{load_config, parse_seed_list, validate, Config, StorageBackend};
use crawl_ledger::crawler::CrawlEngine;
use crawl_ledger::output::{log_progress, progress_channel};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Crawl-Ledger: a bounded, polite recursive web crawler
///
/// Crawl-Ledger fetches the seed URLs, follows links up to the given depth
/// while respecting robots.txt, stores the visible text of every page, and
/// finishes with a report of uncrawled and forbidden URLs.
#[derive(Parser, Debug)]
#[command(name = "crawl-ledger")]
#[command(version)]
#[command(about = "A bounded, polite recursive web crawler", long_about = None)]
struct Cli {
    /// Seed URLs (comma-separated or repeated)
    #[arg(value_name = "SEEDS", value_delimiter = ',')]
    seeds: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum link depth to follow from the seeds
    #[arg(short, long)]
    depth: Option<u32>,

    /// Maximum number of pages fetched at once
    #[arg(long)]
    concurrency: Option<u32>,

    /// Where crawled pages are stored
    #[arg(long, value_enum)]
    backend: Option<StorageBackend>,

    /// Directory for JSON page documents
    #[arg(long, value_name = "DIR")]
    pages_dir: Option<String>,

    /// SQLite database file
    #[arg(long, value_name = "FILE")]
    database: Option<String>,

    /// Directory the crawl report is written to
    #[arg(long, value_name = "DIR")]
    report_dir: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    if cli.dry_run {
        validate(&config).context("Invalid configuration")?;
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("crawl_ledger=info,warn"),
            1 => EnvFilter::new("crawl_ledger=debug,info"),
            2 => EnvFilter::new("crawl_ledger=trace,debug"),
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

/// Loads the config file (if any) and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    if !cli.seeds.is_empty() {
        config.crawler.seeds = parse_seed_list(&cli.seeds);
    }
    if let Some(depth) = cli.depth {
        config.crawler.max_depth = depth;
    }
    if let Some(concurrency) = cli.concurrency {
        config.crawler.max_concurrent_pages_open = concurrency;
    }
    if let Some(backend) = cli.backend {
        config.output.backend = backend;
    }
    if let Some(dir) = &cli.pages_dir {
        config.output.pages_dir = dir.clone();
    }
    if let Some(path) = &cli.database {
        config.output.database_path = path.clone();
    }
    if let Some(dir) = &cli.report_dir {
        config.output.report_dir = dir.clone();
    }

    if config.crawler.seeds.is_empty() {
        anyhow::bail!("No seed URLs given; pass them as arguments or under [crawler] seeds");
    }

    Ok(config)
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Crawl-Ledger Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!(
        "  Max concurrent pages: {}",
        config.crawler.max_concurrent_pages_open
    );
    println!("  Fetch timeout: {}s", config.crawler.fetch_timeout_secs);
    println!("  robots.txt timeout: {}s", config.crawler.robots_timeout_secs);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Backend: {}", config.output.backend);
    match config.output.backend {
        StorageBackend::Json => println!("  Pages directory: {}", config.output.pages_dir),
        StorageBackend::Sqlite => println!("  Database: {}", config.output.database_path),
    }
    println!("  Report directory: {}", config.output.report_dir);

    println!("\nSeeds ({}):", config.crawler.seeds.len());
    for seed in &config.crawler.seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let engine = CrawlEngine::from_config(&config).context("Failed to start crawl")?;

    let (progress, receiver) = progress_channel();
    let progress_task = tokio::spawn(receiver.run(log_progress));
    let engine = engine.with_progress(progress);

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping crawl");
            on_ctrl_c.cancel();
        }
    });

    let result = engine.run(&config.crawler.seeds, cancel).await;

    // Closes the progress channel
    drop(engine);
    if let Err(e) = progress_task.await {
        tracing::debug!("Progress task ended abnormally: {}", e);
    }

    let report = result.context("Crawl failed")?;
    tracing::info!(
        "Crawl {} in {}s; report written to {}",
        if report.cancelled { "cancelled" } else { "completed" },
        (report.finished_at - report.started_at).num_seconds(),
        config.output.report_dir
    );

    Ok(())
}
