//! Output module for presenting stored crawl results
//!
//! This module handles:
//! - Markdown rendering of pages, endpoints and schemas
//! - Aggregate statistics over a repository

mod markdown;
pub mod stats;

pub use markdown::{
    format_endpoint_markdown, format_page_markdown, format_schema_markdown,
    format_site_info_markdown,
};
pub use stats::{load_statistics, print_statistics, CrawlStatistics};
