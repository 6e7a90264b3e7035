use crate::storage::{CrawlStatus, SiteInfo};
use chrono::Utc;

/// Running counts for one crawl run, turned into `SiteInfo` at the end
#[derive(Debug, Clone, Default)]
pub struct CrawlTally {
    /// Fetches started (successful or not); bounded by max_pages
    pub pages_started: usize,
    pub pages_saved: usize,
    pub endpoints: usize,
    pub schemas: usize,
    pub failed_urls: Vec<String>,
    /// Title of the seed page, used as the site title
    pub site_title: Option<String>,
}

impl CrawlTally {
    pub fn record_saved(&mut self, endpoints: usize, schemas: usize) {
        self.pages_saved += 1;
        self.endpoints += endpoints;
        self.schemas += schemas;
    }

    pub fn record_failure(&mut self, url: &str) {
        self.failed_urls.push(url.to_string());
    }

    pub fn failed_count(&self) -> usize {
        self.failed_urls.len()
    }

    /// Builds the site summary for a finished run
    pub fn into_site_info(self, base_url: &str, status: CrawlStatus) -> SiteInfo {
        SiteInfo {
            base_url: base_url.to_string(),
            title: self.site_title.unwrap_or_else(|| base_url.to_string()),
            crawled_at: Utc::now(),
            page_count: self.pages_saved,
            endpoint_count: self.endpoints,
            schema_count: self.schemas,
            failed_count: self.failed_urls.len(),
            failed_urls: self.failed_urls,
            status,
        }
    }
}
