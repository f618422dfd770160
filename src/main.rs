//! Topic-Crawler main entry point
//!
//! This is the command-line interface for the topic crawler.

use clap::Parser;
use std::path::{Path, PathBuf};
use topic_crawler::config::{load_config_with_hash, Config};
use topic_crawler::crawler::run_crawl;
use topic_crawler::CrawlPhase;
use tracing_subscriber::EnvFilter;

/// Topic-Crawler: a depth-bounded breadth-first topic crawler
///
/// Crawls outward from a seed URL one depth level at a time, classifies the
/// topic of each page, and stores one row per page in a SQLite database.
/// When any page in a wave fails, the crawl halts after writing a checkpoint;
/// the next run resumes from it.
#[derive(Parser, Debug)]
#[command(name = "topic-crawler")]
#[command(version)]
#[command(about = "A depth-bounded breadth-first topic crawler", long_about = None)]
struct Cli {
    /// Seed URL to start crawling from
    #[arg(long, value_name = "URL", required_unless_present = "stats")]
    url: Option<String>,

    /// Pages at this depth or deeper are not crawled (the seed is depth 0)
    #[arg(long, value_name = "N", required_unless_present = "stats")]
    max_depth: Option<u32>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Start from the seed even if a checkpoint exists
    #[arg(long, conflicts_with = "stats")]
    fresh: bool,

    /// Show statistics from the result database and exit
    #[arg(long, conflicts_with_all = ["url", "max_depth"])]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    (cfg, Some(hash))
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            (Config::default(), None)
        }
    };

    if cli.stats {
        return handle_stats(&config);
    }

    match (cli.url, cli.max_depth) {
        (Some(url), Some(max_depth)) => {
            handle_crawl(&config, &url, max_depth, cli.fresh, config_hash).await
        }
        _ => Err("--url and --max-depth are required".into()),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("topic_crawler=info,warn"),
            1 => EnvFilter::new("topic_crawler=debug,info"),
            2 => EnvFilter::new("topic_crawler=trace,debug"),
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

/// Handles the --stats mode: shows statistics from the result database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use topic_crawler::output::{load_statistics, print_statistics};
    use topic_crawler::storage::SqliteStorage;

    println!("Database: {}\n", config.output.database_path);

    let storage = SqliteStorage::new(
        Path::new(&config.output.database_path),
        &config.output.results_table,
    )?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: &Config,
    url: &str,
    max_depth: u32,
    fresh: bool,
    config_hash: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Workers: {}, failure queue capacity: {}, checkpoint: {}",
        config.crawler.worker_count(),
        config.crawler.failure_queue_capacity,
        config.crawler.checkpoint_path
    );

    let report = match run_crawl(config, url, max_depth, fresh, config_hash).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    if report.dropped_failures > 0 {
        tracing::warn!(
            "{} failed page(s) did not fit in the failure queue and were not checkpointed",
            report.dropped_failures
        );
    }

    match report.phase {
        CrawlPhase::HaltedOnFailure => {
            for state in &report.failed {
                tracing::warn!("Failed: {} (depth {})", state.url, state.depth);
            }
        }
        phase => tracing::info!(
            "Crawl completed successfully: {} ({} pages)",
            phase,
            report.pages_dispatched()
        ),
    }

    report.into_result()?;
    Ok(())
}
