//! Page extraction
//!
//! Turns one fetched page into its title, the endpoints and schemas it
//! documents, and its outbound links. Endpoints and schemas are found by a
//! pipeline of independent matchers, one per markup convention. Each matcher
//! only reports what it recognises; their results are merged in pipeline
//! order and the first record for an endpoint `(method, path)` or a schema
//! name wins. Extraction never fails: a page nothing recognises yields empty
//! lists.

pub mod endpoint;
pub mod links;
pub mod schema;
pub mod section;
pub mod table;
pub mod text;

pub use links::{extract_links, extract_title};

use crate::storage::{Endpoint, Schema};
use scraper::Html;
use std::collections::HashSet;
use tracing::debug;
use url::Url;

/// Recognises endpoints written in one markup convention
pub trait EndpointMatcher: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    fn find(&self, doc: &Html, source_url: &str) -> Vec<Endpoint>;
}

/// Recognises schemas written in one markup convention
pub trait SchemaMatcher: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    fn find(&self, doc: &Html, source_url: &str) -> Vec<Schema>;
}

/// Everything extracted from one page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub title: String,
    pub endpoints: Vec<Endpoint>,
    pub schemas: Vec<Schema>,
    pub links: Vec<String>,
}

/// An ordered set of matchers
pub struct Extractor {
    endpoint_matchers: Vec<Box<dyn EndpointMatcher>>,
    schema_matchers: Vec<Box<dyn SchemaMatcher>>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::empty()
            .with_endpoint_matcher(endpoint::BlockMatcher)
            .with_endpoint_matcher(endpoint::HeadingMatcher)
            .with_endpoint_matcher(endpoint::CodeLineMatcher)
            .with_schema_matcher(schema::BlockMatcher)
            .with_schema_matcher(schema::HeadingMatcher)
    }
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field(
                "endpoint_matchers",
                &self.endpoint_matchers.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .field(
                "schema_matchers",
                &self.schema_matchers.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Extractor {
    /// An extractor with no matchers; it still finds titles and links
    pub fn empty() -> Self {
        Self {
            endpoint_matchers: Vec::new(),
            schema_matchers: Vec::new(),
        }
    }

    pub fn with_endpoint_matcher(mut self, matcher: impl EndpointMatcher + 'static) -> Self {
        self.endpoint_matchers.push(Box::new(matcher));
        self
    }

    pub fn with_schema_matcher(mut self, matcher: impl SchemaMatcher + 'static) -> Self {
        self.schema_matchers.push(Box::new(matcher));
        self
    }

    /// Extracts a page fetched from `url`
    pub fn extract(&self, html: &str, url: &Url) -> Extraction {
        let doc = Html::parse_document(html);
        let source_url = url.as_str();

        let mut seen_endpoints = HashSet::new();
        let mut endpoints = Vec::new();
        for matcher in &self.endpoint_matchers {
            let found = matcher.find(&doc, source_url);
            debug!("{} matcher found {} endpoints on {}", matcher.name(), found.len(), url);
            for endpoint in found {
                if seen_endpoints.insert((endpoint.method, endpoint.path.clone())) {
                    endpoints.push(endpoint);
                }
            }
        }

        let mut seen_schemas = HashSet::new();
        let mut schemas = Vec::new();
        for matcher in &self.schema_matchers {
            let found = matcher.find(&doc, source_url);
            debug!("{} matcher found {} schemas on {}", matcher.name(), found.len(), url);
            for schema in found {
                if seen_schemas.insert(schema.name.clone()) {
                    schemas.push(schema);
                }
            }
        }

        Extraction {
            title: extract_title(&doc, url),
            endpoints,
            schemas,
            links: extract_links(&doc, url),
        }
    }
}

/// Extracts a page with the standard matchers
pub fn extract_page(html: &str, url: &Url) -> Extraction {
    Extractor::default().extract(html, url)
}
