//! Sumi-Seek main entry point
//!
//! Command-line interface for crawling, indexing, ranking and maintaining a
//! Sumi-Seek corpus.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use sumi_seek::backlinks::propagate;
use sumi_seek::config::{load_config_with_hash, Config};
use sumi_seek::crawler::{build_http_client, run_jobs};
use sumi_seek::index::build_index;
use sumi_seek::output::{load_statistics, print_rank_outcome, print_statistics};
use sumi_seek::ranking::Ranker;
use sumi_seek::storage::{open_storage, DocumentStore};
use tracing_subscriber::EnvFilter;

/// Sumi-Seek: a small polite web search engine
///
/// Without a mode flag, runs every configured crawl job. Jobs resume from
/// their last checkpoint unless `--fresh` is given.
#[derive(Parser, Debug)]
#[command(name = "sumi-seek")]
#[command(version)]
#[command(about = "A small polite web search engine", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Only run the named crawl job
    #[arg(long, value_name = "NAME")]
    job: Option<String>,

    /// Discard saved checkpoints and filters before crawling
    #[arg(long)]
    fresh: bool,

    /// Rebuild the inverted index from the stored documents and exit
    #[arg(long, conflicts_with_all = ["query", "propagate", "dedupe", "stats", "dry_run"])]
    index: bool,

    /// Rank stored documents against a query and exit
    #[arg(long, value_name = "TEXT", conflicts_with_all = ["propagate", "dedupe", "stats", "dry_run"])]
    query: Option<String>,

    /// Run one backlink weight propagation pass and exit
    #[arg(long, conflicts_with_all = ["dedupe", "stats", "dry_run"])]
    propagate: bool,

    /// Remove documents with duplicate content and exit
    #[arg(long, conflicts_with_all = ["stats", "dry_run"])]
    dedupe: bool,

    /// Show corpus statistics and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,

    /// Validate config and show the jobs that would run
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config, cli.job.as_deref());
        Ok(())
    } else if cli.stats {
        handle_stats(&config)
    } else if cli.dedupe {
        handle_dedupe(&config)
    } else if cli.propagate {
        handle_propagate(&config).await
    } else if let Some(query) = cli.query.as_deref() {
        handle_query(&config, query)
    } else if cli.index {
        handle_index(&config).await
    } else {
        handle_crawl(&config, cli.fresh, cli.job.as_deref()).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_seek=info,warn"),
            1 => EnvFilter::new("sumi_seek=debug,info"),
            2 => EnvFilter::new("sumi_seek=trace,debug"),
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

fn handle_dry_run(config: &Config, only: Option<&str>) {
    println!("=== Sumi-Seek Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Default max depth: {}", config.crawler.max_depth);
    println!("  Depth overflow: {:?}", config.crawler.depth_overflow);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!(
        "  Delay between pages: {}-{}ms",
        config.crawler.delay_min_ms, config.crawler.delay_max_ms
    );
    println!(
        "  Min available memory: {}%",
        config.crawler.min_available_memory_percent
    );

    println!("\nUser Agent: {}", config.user_agent.header_value());
    println!("Database: {}", config.storage.database_path);

    let jobs: Vec<_> = config
        .jobs
        .iter()
        .filter(|job| only.map_or(true, |name| job.name == name))
        .collect();
    println!("\nJobs ({}):", jobs.len());
    for job in &jobs {
        println!(
            "  - {} -> {} (depth {})",
            job.name,
            job.seed,
            job.max_depth.unwrap_or(config.crawler.max_depth)
        );
    }

    println!("\nNo-index Domains ({}):", config.no_index.len());
    for entry in &config.no_index {
        println!("  - {}", entry.domain);
    }

    println!("\n✓ Configuration is valid");
}

fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.storage.database_path);
    let storage = open_storage(Path::new(&config.storage.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);
    Ok(())
}

fn handle_dedupe(config: &Config) -> anyhow::Result<()> {
    let mut storage = open_storage(Path::new(&config.storage.database_path))?;
    let removed = storage.remove_duplicate_content()?;
    println!("Removed {} duplicate documents", removed);
    Ok(())
}

async fn handle_propagate(config: &Config) -> anyhow::Result<()> {
    let mut storage = open_storage(Path::new(&config.storage.database_path))?;
    let client = build_http_client(
        &config.user_agent,
        Duration::from_secs(config.crawler.request_timeout_secs),
    )?;
    let report = propagate(&client, &mut storage).await?;
    println!(
        "Scanned {} documents ({} unreachable), raised {} weights by {:.4} in total",
        report.documents_scanned,
        report.fetch_failures,
        report.targets_updated,
        report.total_increment
    );
    Ok(())
}

fn handle_query(config: &Config, query: &str) -> anyhow::Result<()> {
    let storage = open_storage(Path::new(&config.storage.database_path))?;
    let outcome = Ranker::from_config(config).query(&storage, query)?;
    print_rank_outcome(query, &outcome);
    Ok(())
}

async fn handle_index(config: &Config) -> anyhow::Result<()> {
    let mut storage = open_storage(Path::new(&config.storage.database_path))?;
    let report = build_index(&config.index, &mut storage).await?;
    println!(
        "Indexed {} documents in {} batches ({} postings, {} awaiting a full batch)",
        report.documents_indexed, report.batches, report.postings_written, report.documents_dropped
    );
    Ok(())
}

async fn handle_crawl(config: &Config, fresh: bool, only: Option<&str>) -> anyhow::Result<()> {
    if let Some(name) = only {
        if !config.jobs.iter().any(|job| job.name == name) {
            bail!("no crawl job named {}", name);
        }
    }

    if fresh {
        tracing::info!("Starting fresh crawl (ignoring previous state)");
    } else {
        tracing::info!("Starting crawl (will resume saved checkpoints)");
    }

    let mut failures = 0;
    for (name, result) in run_jobs(config, fresh, only).await {
        match result {
            Ok(report) => tracing::info!(
                "Job {} finished: {} visited, {} stored, {} disallowed, {} failed, {} queued{}",
                name,
                report.visited,
                report.stored,
                report.disallowed,
                report.failed,
                report.frontier_remaining,
                if report.depth_terminated {
                    " (reached target depth)"
                } else {
                    ""
                }
            ),
            Err(e) => {
                tracing::error!("Job {} failed: {}", name, e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{} crawl job(s) failed", failures);
    }
    Ok(())
}
