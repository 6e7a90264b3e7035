//! Statistics generation from a stored crawl
//!
//! This module provides functionality for aggregating and displaying
//! statistics over every page record in a repository.

use crate::storage::search::load_pages;
use crate::storage::{HttpMethod, SiteInfo, Storage, StorageResult};
use std::collections::BTreeMap;

/// Repository statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlStatistics {
    /// Page records that could be read
    pub total_pages: usize,

    /// Page records that were corrupt or unreadable
    pub unreadable_pages: usize,

    pub total_endpoints: usize,
    pub total_schemas: usize,
    pub total_parameters: usize,

    /// Endpoint count per HTTP method
    pub endpoints_by_method: BTreeMap<HttpMethod, usize>,

    /// Pages from which nothing was extracted
    pub pages_without_records: usize,

    /// The site summary of the last crawl, if any
    pub site_info: Option<SiteInfo>,
}

/// Loads statistics from storage
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - The repository could not be listed, or the site
///   summary is corrupt
pub fn load_statistics(storage: &dyn Storage) -> StorageResult<CrawlStatistics> {
    let stored = load_pages(storage)?;

    let mut stats = CrawlStatistics {
        total_pages: stored.pages.len(),
        unreadable_pages: stored.skipped.len(),
        site_info: storage.get_site_info()?,
        ..CrawlStatistics::default()
    };

    for page in &stored.pages {
        if page.endpoints.is_empty() && page.schemas.is_empty() {
            stats.pages_without_records += 1;
        }
        stats.total_schemas += page.schemas.len();
        for endpoint in &page.endpoints {
            stats.total_endpoints += 1;
            stats.total_parameters += endpoint.parameters.len();
            *stats.endpoints_by_method.entry(endpoint.method).or_insert(0) += 1;
        }
    }

    Ok(stats)
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Repository Statistics ===\n");

    if let Some(info) = &stats.site_info {
        println!("Last crawl:");
        println!("  Site: {} ({})", info.title, info.base_url);
        println!("  Crawled at: {}", info.crawled_at);
        println!("  Status: {}", info.status);
        println!("  Failed pages: {}", info.failed_count);
        println!();
    }

    println!("Overview:");
    println!("  Pages stored: {}", stats.total_pages);
    println!("  Endpoints: {}", stats.total_endpoints);
    println!("  Schemas: {}", stats.total_schemas);
    println!("  Parameters: {}", stats.total_parameters);
    println!();

    if !stats.endpoints_by_method.is_empty() {
        println!("Endpoints by Method:");
        // Sort methods by count (descending)
        let mut method_counts: Vec<_> = stats.endpoints_by_method.iter().collect();
        method_counts.sort_by(|a, b| b.1.cmp(a.1));

        for (method, count) in method_counts {
            let percentage = (*count as f64 / stats.total_endpoints as f64) * 100.0;
            println!("  {}: {} ({:.1}%)", method, count, percentage);
        }
        println!();
    }

    if stats.unreadable_pages > 0 {
        println!("Unreadable records: {}", stats.unreadable_pages);
    }

    let with_records = stats.total_pages - stats.pages_without_records;
    let coverage = if stats.total_pages > 0 {
        (with_records as f64 / stats.total_pages as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Extraction Coverage: {:.1}% ({} / {} pages yielded endpoints or schemas)",
        coverage, with_records, stats.total_pages
    );
}
