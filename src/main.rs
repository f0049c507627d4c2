//! Sumi-Seek main entry point
//!
//! This is the command-line interface for the Sumi-Seek search engine.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use sumi_seek::config::{load_config_with_hash, Config};
use sumi_seek::crawler::{crawl, StopHandle};
use sumi_seek::output::{load_statistics, print_search_results, print_statistics};
use sumi_seek::rank::PageRanker;
use sumi_seek::search::Searcher;
use sumi_seek::storage::open_index;
use tracing_subscriber::EnvFilter;

/// Number of page words shown under each search result
const PREVIEW_WORDS: usize = 30;

/// Sumi-Seek: A small self-contained web search engine
///
/// Sumi-Seek crawls pages from seed URLs into a word-position index,
/// ranks pages by link authority, and answers multi-word queries by
/// combining word proximity with authority.
#[derive(Parser, Debug)]
#[command(name = "sumi-seek")]
#[command(version = "1.0.0")]
#[command(about = "A small self-contained web search engine", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", default_value = "seek.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl from the configured seeds and index every fetched page
    Crawl,

    /// Compute page ranks over the indexed link graph
    Rank,

    /// Search the index (at least two words)
    Search {
        /// Query words
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Show index statistics and exit
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    match cli.command {
        Command::Crawl => handle_crawl(config).await,
        Command::Rank => handle_rank(&config),
        Command::Search { query } => handle_search(&config, &query.join(" ")),
        Command::Stats => handle_stats(&config),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
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

/// Handles the crawl command; Ctrl-C requests a graceful stop
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Seeds: {}, max depth: {}, batch size: {}",
        config.crawler.seeds.len(),
        config.crawler.max_depth,
        config.crawler.batch_size
    );

    let stop = StopHandle::new();
    let signal_stop = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight work");
            signal_stop.stop();
        }
    });

    let report = crawl(config, stop).await.context("Crawl failed")?;
    if report.stopped {
        tracing::info!("Crawl was stopped early; run `crawl` again to continue");
    }

    Ok(())
}

/// Handles the rank command: recomputes and stores all page ranks
fn handle_rank(config: &Config) -> anyhow::Result<()> {
    let mut index = open_database(config)?;
    let ranker = PageRanker::new(&config.rank);
    let entries = ranker.rank_index(&mut index).context("Ranking failed")?;

    println!(
        "Page ranks calculated for {} URLs over {} iterations",
        entries.len(),
        config.rank.iterations
    );
    Ok(())
}

/// Handles the search command
fn handle_search(config: &Config, query: &str) -> anyhow::Result<()> {
    let index = open_database(config)?;
    let searcher = Searcher::new(&index, config.search.result_limit);
    let results = searcher.search_with_words(query)?;

    print_search_results(&results, PREVIEW_WORDS);
    Ok(())
}

/// Handles the stats command: shows statistics from the index
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.index.database_path);

    let index = open_database(config)?;
    let stats = load_statistics(&index)?;
    print_statistics(&stats);

    Ok(())
}

fn open_database(config: &Config) -> anyhow::Result<sumi_seek::SqliteIndex> {
    let path = Path::new(&config.index.database_path);
    open_index(path).with_context(|| format!("Failed to open index {}", path.display()))
}
