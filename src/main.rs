//! Harvestman main entry point
//!
//! Command-line shell around the crawl engine: loads a TOML run
//! configuration, drives a crawl with the HTTP renderer backend, and prints
//! the engine's progress events. Ctrl-C maps to the cooperative stop signal,
//! so an interrupted run finalizes as `stopped` rather than being killed.

use anyhow::Context;
use clap::Parser;
use harvestman::config::load_config;
use harvestman::crawler::{ControlHandle, Coordinator, HttpRenderer};
use harvestman::events::{CrawlEvent, EventSender};
use harvestman::output::{format_size, print_task_history, print_task_resources};
use harvestman::storage::{open_store, Store};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Harvestman: a breadth-first site harvester
///
/// Walks a site from a start URL, downloads the resources each page embeds,
/// and records tasks, resources, and errors in a SQLite database.
#[derive(Parser, Debug)]
#[command(name = "harvestman")]
#[command(version)]
#[command(about = "A breadth-first site harvester", long_about = None)]
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

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with_all = ["history", "resources", "prune"])]
    dry_run: bool,

    /// Show recent task history and exit
    #[arg(long, conflicts_with_all = ["dry_run", "resources", "prune"])]
    history: bool,

    /// List one task's downloaded resources and exit
    #[arg(long, value_name = "TASK_ID", conflicts_with_all = ["dry_run", "history", "prune"])]
    resources: Option<i64>,

    /// Delete a finished task's records and exit
    #[arg(long, value_name = "TASK_ID", conflicts_with_all = ["dry_run", "history", "resources"])]
    prune: Option<i64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.history {
        let store = open_store(&config.database_path)?;
        print_task_history(&store, 50)?;
    } else if let Some(task_id) = cli.resources {
        let store = open_store(&config.database_path)?;
        print_task_resources(&store, task_id)?;
    } else if let Some(task_id) = cli.prune {
        let mut store = open_store(&config.database_path)?;
        store.delete_task(task_id)?;
        println!("Deleted task #{}", task_id);
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("harvestman=info,warn"),
            1 => EnvFilter::new("harvestman=debug,info"),
            2 => EnvFilter::new("harvestman=trace,debug"),
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

/// Handles --dry-run: shows the validated configuration
fn handle_dry_run(config: &harvestman::CrawlConfig) {
    println!("=== Harvestman Dry Run ===\n");

    println!("Start URL:  {}", config.start_url);
    println!("Save path:  {}", config.save_path.display());
    println!("Database:   {}", config.database_path.display());
    println!();
    println!("Max depth:      {}", config.max_depth);
    println!("Max pages:      {}", config.max_pages);
    println!("Page delay:     {}ms", config.delay_ms);
    println!("Domain limit:   {}", config.domain_limit);
    println!("Headless:       {}", config.headless);
    println!("Downloads:      {} concurrent, {} retries",
        config.max_concurrent_downloads, config.max_retries);
    println!();
    println!("Resource categories:");
    println!("  images:      {}", config.resources.images);
    println!("  videos:      {}", config.resources.videos);
    println!("  audios:      {}", config.resources.audios);
    println!("  documents:   {}", config.resources.documents);
    println!("  stylesheets: {}", config.resources.stylesheets);
    println!("  scripts:     {}", config.resources.scripts);

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: harvestman::CrawlConfig) -> anyhow::Result<()> {
    let (events, mut rx) = EventSender::channel();
    let control = ControlHandle::new();

    // Ctrl-C requests a cooperative stop; the run finalizes as `stopped`
    let ctrl_c_handle = control.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Stop requested, finishing current page...");
            ctrl_c_handle.stop();
        }
    });

    // Drain engine events without ever blocking the crawl loop
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                CrawlEvent::Log(message) => tracing::info!("{}", message),
                CrawlEvent::Stats(counters) => {
                    tracing::debug!(
                        "pages={} resources={} size={} errors={}",
                        counters.pages,
                        counters.total_resources(),
                        format_size(counters.total_size),
                        counters.errors
                    );
                }
                CrawlEvent::Complete { message, counters } => {
                    tracing::info!("{}", message);
                    println!("\n{}", message);
                    println!(
                        "  pages: {}  images: {}  videos: {}  audios: {}  documents: {}  others: {}",
                        counters.pages,
                        counters.images,
                        counters.videos,
                        counters.audios,
                        counters.documents,
                        counters.others
                    );
                    println!(
                        "  downloaded: {}  errors: {}",
                        format_size(counters.total_size),
                        counters.errors
                    );
                }
            }
        }
    });

    let mut coordinator = Coordinator::new(config, HttpRenderer::new(), events, control)
        .context("failed to initialize crawl")?;
    let task_id = coordinator.task_id();

    let result = coordinator.run().await;

    // Dropping the coordinator closes the event channel, letting the
    // printer drain and exit
    drop(coordinator);
    let _ = printer.await;

    match result {
        Ok(_) => {
            println!("\nTask #{} recorded. `--resources {}` lists its downloads.", task_id, task_id);
            Ok(())
        }
        Err(e) => Err(anyhow::Error::new(e).context("crawl failed")),
    }
}
