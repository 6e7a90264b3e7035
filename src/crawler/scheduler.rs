//! Scheduler for managing the crawl frontier and request pacing
//!
//! This module handles:
//! - The FIFO frontier queue (breadth-first: shallow pages first)
//! - Respecting a minimum delay between request dispatches

use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// A URL queued for fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedUrl {
    /// The normalized URL to fetch
    pub url: Url,

    /// Link distance from the seed (the seed is depth 0)
    pub depth: u32,
}

/// Scheduler owns the frontier and paces dispatches
///
/// URLs come out in the order they went in. Since every URL is enqueued
/// while its parent is processed, the frontier always holds depth `d`
/// pages ahead of depth `d + 1` pages.
#[derive(Debug)]
pub struct Scheduler {
    /// Frontier queue of URLs to fetch
    frontier: VecDeque<QueuedUrl>,

    /// Minimum time between two dispatches
    min_interval: Duration,

    /// When the last URL was handed out
    last_dispatch: Option<Instant>,
}

impl Scheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `min_interval` - Minimum delay between request dispatches; zero
    ///   disables pacing
    pub fn new(min_interval: Duration) -> Self {
        Self {
            frontier: VecDeque::new(),
            min_interval,
            last_dispatch: None,
        }
    }

    /// Gets the next URL to fetch
    ///
    /// Waits until `min_interval` has passed since the previous dispatch.
    ///
    /// # Returns
    ///
    /// * `Some(QueuedUrl)` - A URL that's ready to fetch
    /// * `None` - The frontier is empty
    pub async fn next_url(&mut self) -> Option<QueuedUrl> {
        let next = self.frontier.pop_front()?;

        if let Some(last) = self.last_dispatch {
            let ready_at = last + self.min_interval;
            if ready_at > Instant::now() {
                tracing::trace!("Pacing: waiting until next dispatch slot for {}", next.url);
                tokio::time::sleep_until(ready_at).await;
            }
        }
        self.last_dispatch = Some(Instant::now());

        Some(next)
    }

    /// Adds a URL to the back of the frontier
    pub fn add_to_frontier(&mut self, url: QueuedUrl) {
        self.frontier.push_back(url);
    }

    /// Drops every queued URL, returning how many were discarded
    pub fn clear(&mut self) -> usize {
        let discarded = self.frontier.len();
        self.frontier.clear();
        discarded
    }

    /// Returns the number of URLs in the frontier
    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    /// Returns whether the frontier is empty
    pub fn is_empty(&self) -> bool {
        self.frontier.is_empty()
    }
}
