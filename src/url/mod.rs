//! URL handling module
//!
//! This module provides URL normalization, registrable-domain extraction,
//! crawl scoping, and the URL ↔ filename mapping used by the repository.

mod domain;
mod filename;
mod normalize;
mod scope;

// Re-export main functions
pub use domain::registrable_domain;
pub use filename::{filename_to_url, url_to_filename, PAGE_EXTENSION};
pub use normalize::normalize_url;
pub use scope::{ScopeDecision, SiteScope};
