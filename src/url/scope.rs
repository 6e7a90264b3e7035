use crate::url::registrable_domain;
use crate::{ConfigError, UrlError};
use regex::{Regex, RegexBuilder};
use url::Url;

/// Outcome of checking a discovered link against the site scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeDecision {
    /// Same registrable domain, not excluded by any skip pattern
    InScope,
    /// Different registrable domain; discovered but never traversed
    OffSite,
    /// Same site but matches a skip pattern (login pages, pricing, ...)
    Skipped,
}

/// The site a crawl is confined to: the seed's registrable domain, minus
/// any URLs matching the configured skip patterns
#[derive(Debug, Clone)]
pub struct SiteScope {
    domain: String,
    skip_patterns: Vec<Regex>,
}

impl SiteScope {
    /// Builds the scope for a seed URL
    ///
    /// Skip patterns are matched case-insensitively against the full URL.
    pub fn for_seed(seed: &Url, skip_patterns: &[String]) -> Result<Self, crate::CrawlError> {
        let domain = registrable_domain(seed).ok_or(UrlError::MissingDomain)?;

        let skip_patterns = skip_patterns
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            domain,
            skip_patterns,
        })
    }

    /// The registrable domain every traversed URL must share
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Decides whether a normalized URL may be enqueued
    pub fn decide(&self, url: &Url) -> ScopeDecision {
        match registrable_domain(url) {
            Some(domain) if domain == self.domain => {}
            _ => return ScopeDecision::OffSite,
        }

        if self
            .skip_patterns
            .iter()
            .any(|pattern| pattern.is_match(url.as_str()))
        {
            return ScopeDecision::Skipped;
        }

        ScopeDecision::InScope
    }
}
