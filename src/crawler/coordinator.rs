//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! one crawl run, including:
//! - Initializing storage and the per-run state
//! - Managing the frontier queue and the visited set
//! - Coordinating fetching, extraction, storage and link following
//! - Handling cancellation
//! - Writing the site summary

use crate::config::Config;
use crate::crawler::fetcher::{FetchError, HttpFetcher, PageFetcher};
use crate::crawler::retry::{fetch_with_retry, RetryPolicy};
use crate::crawler::scheduler::{QueuedUrl, Scheduler};
use crate::extract::Extractor;
use crate::state::{CrawlTally, PageState, VisitedSet};
use crate::storage::{CrawlStatus, Page, SiteInfo, Storage};
use crate::url::{normalize_url, ScopeDecision, SiteScope};
use crate::{CrawlError, Result};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::{self, JoinSet};

type FetchOutcome = (QueuedUrl, std::result::Result<String, FetchError>);

/// Main crawler structure
///
/// One `Crawler` can run any number of crawls; the frontier, visited set
/// and tally live only for the duration of a single `crawl` call.
pub struct Crawler<S: Storage, F: PageFetcher> {
    storage: Arc<S>,
    fetcher: Arc<F>,
    extractor: Extractor,
    retry: RetryPolicy,
    skip_patterns: Vec<String>,
    concurrency: usize,
    request_delay: Duration,
    cancel: Option<watch::Receiver<bool>>,
}

impl<S: Storage> Crawler<S, HttpFetcher> {
    /// Creates a crawler that fetches over HTTP
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Successfully created crawler
    /// * `Err(CrawlError)` - The HTTP client could not be built
    pub fn from_config(config: &Config, storage: Arc<S>) -> Result<Self> {
        let fetcher = HttpFetcher::from_config(config)?;
        Ok(Self::with_fetcher(config, storage, Arc::new(fetcher)))
    }
}

impl<S, F> Crawler<S, F>
where
    S: Storage,
    F: PageFetcher + 'static,
{
    /// Creates a crawler around any page source
    pub fn with_fetcher(config: &Config, storage: Arc<S>, fetcher: Arc<F>) -> Self {
        Self {
            storage,
            fetcher,
            extractor: Extractor::default(),
            retry: RetryPolicy::from_config(&config.retry),
            skip_patterns: config.scope.skip_patterns.clone(),
            concurrency: config.crawler.concurrency.max(1),
            request_delay: config.crawler.request_delay(),
            cancel: None,
        }
    }

    /// Replaces the standard extraction pipeline
    pub fn with_extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Stops the crawl once `true` is sent on the channel
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Crawls the site of `start_url`
    ///
    /// The frontier is processed breadth-first until it is empty or
    /// `max_pages` fetches have been started. Links deeper than `max_depth`
    /// are not followed. A page that cannot be fetched is tallied and the
    /// crawl moves on.
    ///
    /// # Returns
    ///
    /// * `Ok(SiteInfo)` - The summary that was written; `partial` if a bound
    ///   cut the crawl short or it was cancelled
    /// * `Err(CrawlError)` - The seed could not be fetched, the storage
    ///   directory is unusable, or the crawl was cancelled before any page
    ///   was saved. No summary is written in these cases.
    ///
    /// A page whose record cannot be written is tallied as failed like a
    /// page that could not be fetched; its links are still followed.
    pub async fn crawl(&self, start_url: &str, max_pages: usize, max_depth: u32) -> Result<SiteInfo> {
        let seed = normalize_url(start_url)?;
        let scope = SiteScope::for_seed(&seed, &self.skip_patterns)?;
        self.storage.initialize()?;

        let max_pages = max_pages.max(1);
        tracing::info!(
            "Starting crawl of {} (site {}, max {} pages, max depth {})",
            seed,
            scope.domain(),
            max_pages,
            max_depth
        );

        let start_time = Instant::now();
        let mut visited = VisitedSet::new();
        let mut scheduler = Scheduler::new(self.request_delay);
        let mut tally = CrawlTally::default();
        let mut in_flight: JoinSet<FetchOutcome> = JoinSet::new();
        let mut dispatched: HashMap<task::Id, QueuedUrl> = HashMap::new();
        let mut cancel = self.cancel.clone();
        let mut truncated = false;
        let mut cancelled = false;

        visited.try_enqueue(seed.as_str());
        scheduler.add_to_frontier(QueuedUrl {
            url: seed.clone(),
            depth: 0,
        });

        loop {
            while in_flight.len() < self.concurrency && tally.pages_started < max_pages {
                let Some(next) = scheduler.next_url().await else {
                    break;
                };
                visited.transition(next.url.as_str(), PageState::Fetching)?;
                tally.pages_started += 1;
                tracing::debug!("Fetching {} (depth {})", next.url, next.depth);

                let fetcher = Arc::clone(&self.fetcher);
                let policy = self.retry.clone();
                let queued = next.clone();
                let handle = in_flight.spawn(async move {
                    let result = fetch_with_retry(fetcher.as_ref(), &next.url, &policy).await;
                    (next, result)
                });
                dispatched.insert(handle.id(), queued);
            }

            if in_flight.is_empty() {
                break;
            }

            let joined = tokio::select! {
                biased;
                _ = cancellation(&mut cancel) => {
                    cancelled = true;
                    break;
                }
                joined = in_flight.join_next_with_id() => joined,
            };

            let (queued, result) = match joined {
                Some(Ok((id, outcome))) => {
                    dispatched.remove(&id);
                    outcome
                }
                Some(Err(e)) => {
                    tracing::error!("Fetch task failed: {}", e);
                    let Some(queued) = dispatched.remove(&e.id()) else {
                        continue;
                    };
                    let error = FetchError::Request(format!("fetch task failed: {}", e));
                    (queued, Err(error))
                }
                None => break,
            };
            let url = queued.url.as_str();

            let body = match result {
                Ok(body) => body,
                Err(error) if queued.depth == 0 => {
                    tracing::error!("Failed to fetch seed {}: {}", url, error);
                    return Err(CrawlError::SeedFetch {
                        url: url.to_string(),
                        source: error,
                    });
                }
                Err(error) => {
                    tracing::warn!("Failed to fetch {}: {}", url, error);
                    visited.transition(url, PageState::FetchFailed)?;
                    tally.record_failure(url);
                    continue;
                }
            };

            let extraction = self.extractor.extract(&body, &queued.url);
            let page = Page {
                title: extraction.title,
                url: url.to_string(),
                endpoints: extraction.endpoints,
                schemas: extraction.schemas,
                content: body,
                crawled_at: Some(Utc::now()),
            };
            if queued.depth == 0 {
                tally.site_title = Some(page.title.clone());
            }

            // Per-page write failures are tallied; directory failures
            // surface in `initialize`
            match self.storage.save_page(&page) {
                Ok(()) => {
                    visited.transition(url, PageState::Extracted)?;
                    tally.record_saved(page.endpoints.len(), page.schemas.len());
                    tracing::info!(
                        "Saved {} ({} endpoints, {} schemas)",
                        url,
                        page.endpoints.len(),
                        page.schemas.len()
                    );
                    if tally.pages_saved % 10 == 0 {
                        tracing::info!(
                            "Progress: {} pages saved, {} failed, {} in frontier",
                            tally.pages_saved,
                            tally.failed_count(),
                            scheduler.frontier_size()
                        );
                    }
                }
                Err(error) => {
                    tracing::warn!("Failed to store {}: {}", url, error);
                    visited.transition(url, PageState::FetchFailed)?;
                    tally.record_failure(url);
                }
            }

            for link in &extraction.links {
                let link = match normalize_url(link) {
                    Ok(link) => link,
                    Err(e) => {
                        tracing::debug!("Ignoring link {}: {}", link, e);
                        continue;
                    }
                };
                match scope.decide(&link) {
                    ScopeDecision::InScope => {}
                    decision => {
                        tracing::debug!("Not following {} ({:?})", link, decision);
                        continue;
                    }
                }
                if visited.contains(link.as_str()) {
                    continue;
                }
                if queued.depth + 1 > max_depth {
                    truncated = true;
                    continue;
                }
                if visited.try_enqueue(link.as_str()) {
                    scheduler.add_to_frontier(QueuedUrl {
                        url: link,
                        depth: queued.depth + 1,
                    });
                }
            }
        }

        if cancelled {
            in_flight.abort_all();
            let discarded = scheduler.clear();
            tracing::warn!(
                "Crawl cancelled: {} fetches abandoned, {} queued URLs discarded",
                in_flight.len(),
                discarded
            );
            if tally.pages_saved == 0 {
                return Err(CrawlError::Cancelled);
            }
        } else if !scheduler.is_empty() {
            tracing::info!(
                "Page limit reached with {} URLs still queued",
                scheduler.frontier_size()
            );
            truncated = true;
        }

        let status = if truncated || cancelled {
            CrawlStatus::Partial
        } else {
            CrawlStatus::Complete
        };
        let info = tally.into_site_info(seed.as_str(), status);
        self.storage.save_site_info(&info)?;

        tracing::info!(
            "Crawl {}: {} pages, {} endpoints, {} schemas, {} failed in {:?}",
            info.status,
            info.page_count,
            info.endpoint_count,
            info.schema_count,
            info.failed_count,
            start_time.elapsed()
        );

        Ok(info)
    }
}

/// Resolves once cancellation is requested; never resolves without a
/// channel or after the sender is dropped
async fn cancellation(cancel: &mut Option<watch::Receiver<bool>>) {
    if let Some(rx) = cancel {
        if rx.wait_for(|cancelled| *cancelled).await.is_ok() {
            return;
        }
    }
    std::future::pending::<()>().await
}
