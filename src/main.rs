//! apidoc-harvester main entry point
//!
//! This is the command-line interface for crawling an API documentation
//! site and querying what was harvested.

use anyhow::{bail, Context};
use apidoc_harvester::config::{load_config, validate, Config};
use apidoc_harvester::crawler::Crawler;
use apidoc_harvester::output::{
    format_page_markdown, format_site_info_markdown, load_statistics, print_statistics,
};
use apidoc_harvester::storage::search::{search_endpoints, search_schemas};
use apidoc_harvester::storage::{FileRepository, Storage};
use apidoc_harvester::url::normalize_url;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

/// apidoc-harvester: an API documentation crawler
///
/// Crawls one documentation site, extracts the endpoints and schemas each
/// page describes, and stores them as JSON records for later queries.
#[derive(Parser, Debug)]
#[command(name = "apidoc-harvester")]
#[command(version)]
#[command(about = "Harvests endpoints and schemas from API documentation sites", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply without one)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Directory holding the page records (overrides the config file)
    #[arg(short, long, value_name = "DIR", global = true)]
    data_dir: Option<PathBuf>,

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
    /// Crawl a documentation site starting at URL
    Crawl {
        /// The seed URL
        url: String,

        /// Maximum number of pages to fetch
        #[arg(long)]
        max_pages: Option<usize>,

        /// Maximum link depth from the seed
        #[arg(long)]
        max_depth: Option<u32>,

        /// Number of concurrent fetches
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Show the summary of the last crawl
    Info,

    /// List the URLs of all stored pages
    List,

    /// Show one stored page
    Show {
        /// URL of the page
        url: String,

        /// Print the raw JSON record instead of markdown
        #[arg(long)]
        json: bool,
    },

    /// Search stored endpoints and schemas
    Search {
        /// Text to look for (case-insensitive)
        query: String,

        /// Maximum number of results per kind
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Show statistics over the stored pages
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = load_configuration(&cli)?;
    if let Some(data_dir) = &cli.data_dir {
        config.output.data_dir = data_dir.clone();
    }

    match cli.command {
        Command::Crawl {
            url,
            max_pages,
            max_depth,
            concurrency,
        } => {
            if let Some(max_pages) = max_pages {
                config.crawler.max_pages = max_pages;
            }
            if let Some(max_depth) = max_depth {
                config.crawler.max_depth = max_depth;
            }
            if let Some(concurrency) = concurrency {
                config.crawler.concurrency = concurrency;
            }
            validate(&config).context("Invalid command-line options")?;
            handle_crawl(&config, &url).await
        }
        Command::Info => handle_info(&config),
        Command::List => handle_list(&config),
        Command::Show { url, json } => handle_show(&config, &url, json),
        Command::Search { query, limit } => handle_search(&config, &query, limit),
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
            0 => EnvFilter::new("apidoc_harvester=info,warn"),
            1 => EnvFilter::new("apidoc_harvester=debug,info"),
            2 => EnvFilter::new("apidoc_harvester=trace,debug"),
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

/// Loads the config file if one was given, otherwise the defaults
fn load_configuration(cli: &Cli) -> anyhow::Result<Config> {
    let Some(path) = &cli.config else {
        tracing::debug!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let config = load_config(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::debug!("Configuration loaded: {:?}", config);
    Ok(config)
}

fn open_repository(config: &Config) -> FileRepository {
    FileRepository::new(&config.output.data_dir)
}

/// Handles the crawl command; Ctrl-C stops the crawl and keeps what was saved
async fn handle_crawl(config: &Config, url: &str) -> anyhow::Result<()> {
    let storage = Arc::new(open_repository(config));
    let (cancel_tx, cancel_rx) = watch::channel(false);

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping crawl");
            let _ = cancel_tx.send(true);
        }
    });

    tracing::info!("Data directory: {}", config.output.data_dir.display());
    let crawler = Crawler::from_config(config, storage)?.with_cancellation(cancel_rx);

    let info = crawler
        .crawl(url, config.crawler.max_pages, config.crawler.max_depth)
        .await
        .with_context(|| format!("Crawl of {} failed", url))?;

    println!("{}", format_site_info_markdown(&info));
    Ok(())
}

/// Handles the info command: shows the stored site summary
fn handle_info(config: &Config) -> anyhow::Result<()> {
    match open_repository(config).get_site_info()? {
        Some(info) => println!("{}", format_site_info_markdown(&info)),
        None => println!(
            "No crawl recorded in {}",
            config.output.data_dir.display()
        ),
    }
    Ok(())
}

/// Handles the list command
fn handle_list(config: &Config) -> anyhow::Result<()> {
    let mut urls = open_repository(config).list_pages()?;
    urls.sort();
    for url in &urls {
        println!("{}", url);
    }
    tracing::info!("{} pages stored", urls.len());
    Ok(())
}

/// Handles the show command
fn handle_show(config: &Config, url: &str, json: bool) -> anyhow::Result<()> {
    let normalized = normalize_url(url).with_context(|| format!("Invalid URL: {}", url))?;
    let repository = open_repository(config);

    let Some(page) = repository.get_page(normalized.as_str())? else {
        bail!("No stored page for {}", normalized);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
    } else {
        println!("{}", format_page_markdown(&page));
    }
    Ok(())
}

/// Handles the search command
fn handle_search(config: &Config, query: &str, limit: usize) -> anyhow::Result<()> {
    let repository = open_repository(config);

    let endpoints = search_endpoints(&repository, query)?;
    println!("Endpoints matching \"{}\" ({}):", query, endpoints.len());
    for hit in endpoints.iter().take(limit) {
        println!(
            "  {} {}  [{}]",
            hit.item.method, hit.item.path, hit.page_url
        );
    }

    let schemas = search_schemas(&repository, query)?;
    println!("\nSchemas matching \"{}\" ({}):", query, schemas.len());
    for hit in schemas.iter().take(limit) {
        println!(
            "  {} ({} properties)  [{}]",
            hit.item.name,
            hit.item.properties.len(),
            hit.page_url
        );
    }

    Ok(())
}

/// Handles the stats command
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Data directory: {}\n", config.output.data_dir.display());

    let stats = load_statistics(&open_repository(config))?;
    print_statistics(&stats);

    Ok(())
}
