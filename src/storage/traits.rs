//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::storage::{Page, SiteInfo};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// The storage directory or a record could not be created or written
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A stored record exists but does not parse
    #[error("Corrupt record {path}: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    /// True for errors that mean a record is unreadable rather than the
    /// storage itself being unavailable
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// One handle is constructed at startup and shared (by reference or `Arc`)
/// between the crawler and every reader. Implementations perform no locking:
/// only one crawl may target a storage location at a time.
pub trait Storage: Send + Sync {
    /// Prepares the storage location for writing
    fn initialize(&self) -> StorageResult<()>;

    // ===== Site Info =====

    /// Replaces the site-level summary
    fn save_site_info(&self, info: &SiteInfo) -> StorageResult<()>;

    /// Gets the site-level summary, `None` if no crawl has completed yet
    fn get_site_info(&self) -> StorageResult<Option<SiteInfo>>;

    // ===== Pages =====

    /// Writes a page record, replacing any record for the same URL
    fn save_page(&self, page: &Page) -> StorageResult<()>;

    /// Gets the page record for a URL
    fn get_page(&self, url: &str) -> StorageResult<Option<Page>>;

    /// Lists the URLs of all stored pages, in enumeration order
    fn list_pages(&self) -> StorageResult<Vec<String>>;
}
