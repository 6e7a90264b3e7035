//! Read-side queries over stored pages
//!
//! Search is a case-insensitive substring match over stored records; there is
//! no index. Records that fail to parse are skipped and reported in the
//! result rather than aborting the scan.

use crate::storage::{Endpoint, Page, Schema, Storage, StorageResult};

/// Pages loaded from storage, plus the records that could not be read
#[derive(Debug, Default)]
pub struct StoredPages {
    pub pages: Vec<Page>,
    /// URLs whose record was corrupt or unreadable
    pub skipped: Vec<String>,
}

/// A query hit with the page it came from
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit<T> {
    pub page_url: String,
    pub page_title: String,
    pub item: T,
}

/// Loads every stored page, skipping (and logging) unreadable records
///
/// Only a failure to enumerate the storage location is returned as an error.
pub fn load_pages(storage: &dyn Storage) -> StorageResult<StoredPages> {
    let mut stored = StoredPages::default();

    for url in storage.list_pages()? {
        match storage.get_page(&url) {
            Ok(Some(page)) => stored.pages.push(page),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Skipping unreadable record for {}: {}", url, e);
                stored.skipped.push(url);
            }
        }
    }

    Ok(stored)
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Finds endpoints whose method, path or description contains `query`
pub fn search_endpoints(
    storage: &dyn Storage,
    query: &str,
) -> StorageResult<Vec<SearchHit<Endpoint>>> {
    let needle = query.trim().to_lowercase();
    let stored = load_pages(storage)?;

    Ok(stored
        .pages
        .into_iter()
        .flat_map(|page| {
            let url = page.url;
            let title = page.title;
            page.endpoints.into_iter().map(move |endpoint| SearchHit {
                page_url: url.clone(),
                page_title: title.clone(),
                item: endpoint,
            })
        })
        .filter(|hit| {
            let e = &hit.item;
            contains_ci(&e.path, &needle)
                || contains_ci(e.method.as_str(), &needle)
                || contains_ci(&e.description, &needle)
        })
        .collect())
}

/// Finds schemas whose name or description contains `query`
pub fn search_schemas(storage: &dyn Storage, query: &str) -> StorageResult<Vec<SearchHit<Schema>>> {
    let needle = query.trim().to_lowercase();
    let stored = load_pages(storage)?;

    Ok(stored
        .pages
        .into_iter()
        .flat_map(|page| {
            let url = page.url;
            let title = page.title;
            page.schemas.into_iter().map(move |schema| SearchHit {
                page_url: url.clone(),
                page_title: title.clone(),
                item: schema,
            })
        })
        .filter(|hit| {
            contains_ci(&hit.item.name, &needle) || contains_ci(&hit.item.description, &needle)
        })
        .collect())
}

/// Endpoints extracted from the page at `source_url`
pub fn find_endpoints_by_source(
    storage: &dyn Storage,
    source_url: &str,
) -> StorageResult<Vec<Endpoint>> {
    let stored = load_pages(storage)?;
    Ok(stored
        .pages
        .into_iter()
        .flat_map(|page| page.endpoints)
        .filter(|e| e.source_url == source_url)
        .collect())
}

/// Schemas extracted from the page at `source_url`
pub fn find_schemas_by_source(
    storage: &dyn Storage,
    source_url: &str,
) -> StorageResult<Vec<Schema>> {
    let stored = load_pages(storage)?;
    Ok(stored
        .pages
        .into_iter()
        .flat_map(|page| page.schemas)
        .filter(|s| s.source_url == source_url)
        .collect())
}
