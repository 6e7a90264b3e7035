//! Crawler module for page fetching and traversal
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `PageFetcher` trait
//! - Retries with exponential backoff for transient failures
//! - The breadth-first frontier and request pacing
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod retry;
mod scheduler;

pub use coordinator::Crawler;
pub use fetcher::{build_http_client, is_html, FetchError, HttpFetcher, PageFetcher};
pub use retry::{fetch_with_retry, RetryPolicy};
pub use scheduler::{QueuedUrl, Scheduler};

use crate::config::Config;
use crate::storage::{FileRepository, SiteInfo};
use crate::Result;
use std::sync::Arc;

/// Crawls `start_url` into the configured data directory using the
/// configured page and depth bounds
///
/// # Example
///
/// ```no_run
/// use apidoc_harvester::config::load_config;
/// use apidoc_harvester::crawler::crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let info = crawl(&config, "https://docs.example.com/").await?;
/// println!("{} pages", info.page_count);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: &Config, start_url: &str) -> Result<SiteInfo> {
    let storage = Arc::new(FileRepository::new(&config.output.data_dir));
    Crawler::from_config(config, storage)?
        .crawl(start_url, config.crawler.max_pages, config.crawler.max_depth)
        .await
}
