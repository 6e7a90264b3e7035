use crate::state::PageState;
use crate::CrawlError;
use std::collections::HashMap;

/// Visited set for one crawl run
///
/// Keys are normalized URL strings. A URL enters the set when it is first
/// enqueued and never leaves, so each URL is fetched at most once per run.
/// Every state change goes through `transition`, which rejects moves the
/// state machine does not allow.
#[derive(Debug, Default)]
pub struct VisitedSet {
    states: HashMap<String, PageState>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of a URL; `Unseen` if it was never enqueued
    pub fn state(&self, url: &str) -> PageState {
        self.states.get(url).copied().unwrap_or(PageState::Unseen)
    }

    /// Whether the URL was ever enqueued in this run
    pub fn contains(&self, url: &str) -> bool {
        self.states.contains_key(url)
    }

    /// Checks and marks in one step: returns true (and records `Enqueued`)
    /// only the first time a URL is offered
    pub fn try_enqueue(&mut self, url: &str) -> bool {
        if self.contains(url) {
            return false;
        }
        self.states.insert(url.to_string(), PageState::Enqueued);
        true
    }

    /// Moves a URL to `next`
    pub fn transition(&mut self, url: &str, next: PageState) -> Result<(), CrawlError> {
        let current = self.state(url);
        if !current.can_transition_to(next) {
            return Err(CrawlError::InvalidTransition {
                url: url.to_string(),
                from: current,
                to: next,
            });
        }
        self.states.insert(url.to_string(), next);
        Ok(())
    }

    /// Number of URLs currently in `state`
    pub fn count(&self, state: PageState) -> usize {
        self.states.values().filter(|s| **s == state).count()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
