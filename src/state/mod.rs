//! State management module
//!
//! This module tracks the per-URL state machine of a crawl run and the
//! running tally the site summary is built from. Nothing here is persisted.

mod page_state;
mod tally;
mod visited;

pub use page_state::PageState;
pub use tally::CrawlTally;
pub use visited::VisitedSet;
