//! Storage module for persisting crawl output
//!
//! This module handles everything written to disk by a crawl:
//! - One JSON record per crawled page, named by the URL → filename mapping
//! - One fixed-name site info record per storage directory
//! - Read-side queries over the stored records

mod file;
mod models;
pub mod search;
mod traits;

pub use file::{FileRepository, SITE_INFO_FILE};
pub use models::{
    CrawlStatus, Endpoint, HttpMethod, Page, Parameter, ParameterLocation, Response, Schema,
    SiteInfo,
};
pub use traits::{Storage, StorageError, StorageResult};

use std::path::Path;

/// Opens a file repository, creating its directory if needed
///
/// # Returns
///
/// * `Ok(FileRepository)` - Directory exists and is usable
/// * `Err(StorageError::Write)` - Directory could not be created
pub fn open_storage(path: &Path) -> StorageResult<FileRepository> {
    let repository = FileRepository::new(path);
    repository.initialize()?;
    Ok(repository)
}
