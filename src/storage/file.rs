//! JSON file storage implementation
//!
//! This module provides a flat-directory implementation of the Storage trait:
//! one pretty-printed JSON file per page plus `site_info.json`.

use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{Page, SiteInfo};
use crate::url::{filename_to_url, url_to_filename};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Fixed name of the site info record
pub const SITE_INFO_FILE: &str = "site_info.json";

/// Scratch file `initialize` writes and removes again
const WRITE_CHECK_FILE: &str = ".write-check";

/// Flat-file storage backend rooted at one directory
#[derive(Debug, Clone)]
pub struct FileRepository {
    root: PathBuf,
}

impl FileRepository {
    /// Creates a handle for the given directory
    ///
    /// Nothing is touched on disk until the first write or `initialize`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The storage directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the record a URL maps to
    pub fn page_path(&self, url: &str) -> PathBuf {
        self.root.join(url_to_filename(url))
    }

    fn ensure_root(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.root).map_err(|source| StorageError::Write {
            path: self.root.clone(),
            source,
        })
    }

    fn write_record<T: Serialize>(&self, path: &Path, record: &T) -> StorageResult<()> {
        self.ensure_root()?;
        let json = serde_json::to_string_pretty(record)?;
        fs::write(path, json).map_err(|source| StorageError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    fn read_record<T: DeserializeOwned>(&self, path: &Path) -> StorageResult<Option<T>> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StorageError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&json)
            .map(Some)
            .map_err(|source| StorageError::Corrupt {
                path: path.to_path_buf(),
                source,
            })
    }
}

impl Storage for FileRepository {
    /// Creates the directory and checks that records can be written to it
    fn initialize(&self) -> StorageResult<()> {
        self.ensure_root()?;

        let marker = self.root.join(WRITE_CHECK_FILE);
        fs::write(&marker, b"")
            .and_then(|()| fs::remove_file(&marker))
            .map_err(|source| StorageError::Write {
                path: self.root.clone(),
                source,
            })
    }

    // ===== Site Info =====

    fn save_site_info(&self, info: &SiteInfo) -> StorageResult<()> {
        self.write_record(&self.root.join(SITE_INFO_FILE), info)
    }

    fn get_site_info(&self) -> StorageResult<Option<SiteInfo>> {
        self.read_record(&self.root.join(SITE_INFO_FILE))
    }

    // ===== Pages =====

    fn save_page(&self, page: &Page) -> StorageResult<()> {
        let path = self.page_path(&page.url);
        self.write_record(&path, page)?;
        tracing::debug!("Saved {} to {}", page.url, path.display());
        Ok(())
    }

    fn get_page(&self, url: &str) -> StorageResult<Option<Page>> {
        self.read_record(&self.page_path(url))
    }

    fn list_pages(&self) -> StorageResult<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.root.clone(),
                    source,
                })
            }
        };

        let mut urls = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StorageError::Read {
                path: self.root.clone(),
                source,
            })?;

            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }

            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if name == SITE_INFO_FILE {
                continue;
            }
            if let Some(url) = filename_to_url(&name) {
                urls.push(url);
            }
        }

        Ok(urls)
    }
}
