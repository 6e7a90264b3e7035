//! Page, endpoint and schema records
//!
//! These are plain value objects: no back-references, no identity beyond
//! their fields. They serialize as field-tagged JSON; fields added after the
//! first release carry `#[serde(default)]` so older records keep loading, and
//! unknown fields are ignored on read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// HTTP method of an endpoint, always stored upper-case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }

    pub fn all() -> [Self; 7] {
        [
            Self::Get,
            Self::Post,
            Self::Put,
            Self::Patch,
            Self::Delete,
            Self::Head,
            Self::Options,
        ]
    }

    /// Methods whose arguments conventionally travel in the query string
    pub fn takes_query_arguments(&self) -> bool {
        matches!(self, Self::Get | Self::Delete | Self::Head | Self::Options)
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::all()
            .into_iter()
            .find(|m| m.as_str() == upper)
            .ok_or_else(|| format!("unknown HTTP method: {}", s))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a parameter is carried in the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Body,
}

impl ParameterLocation {
    /// Parses the vocabulary used in "In"/"Location" columns
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "path" | "url" => Some(Self::Path),
            "query" | "querystring" | "query string" => Some(Self::Query),
            "header" | "headers" => Some(Self::Header),
            "body" | "formdata" | "form" | "json" | "payload" => Some(Self::Body),
            _ => None,
        }
    }
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Body => "body",
        };
        f.write_str(s)
    }
}

/// One request parameter of an endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub location: ParameterLocation,
    #[serde(rename = "type", default)]
    pub param_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: String,
}

/// One documented response of an endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: String,
    #[serde(default)]
    pub description: String,
    /// Example payload or the name of the schema the body follows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

/// An API endpoint extracted from a documentation page
///
/// `(method, path)` is not unique across the corpus: the same endpoint
/// documented on two pages is kept twice, each with its own `source_url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub path: String,
    pub method: HttpMethod,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Keyed by status code string ("200", "404", "default", ...)
    #[serde(default)]
    pub responses: BTreeMap<String, Response>,
    pub source_url: String,
}

/// A data schema extracted from a documentation page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Property name to a semi-structured definition
    /// (`{"type": ..., "description": ..., "required": ...}` and whatever else
    /// the page provided)
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
    pub source_url: String,
}

/// The stored record of one crawled URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
    #[serde(default)]
    pub schemas: Vec<Schema>,
    /// Raw markup as fetched, kept for re-extraction and excerpts
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawled_at: Option<DateTime<Utc>>,
}

/// Whether a crawl ran to exhaustion or was cut short
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlStatus {
    /// The frontier drained naturally
    Complete,
    /// Page budget, depth budget or cancellation stopped the crawl
    Partial,
}

impl fmt::Display for CrawlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete => f.write_str("complete"),
            Self::Partial => f.write_str("partial"),
        }
    }
}

/// Site-level summary; exactly one per storage directory, overwritten by
/// every crawl run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteInfo {
    pub base_url: String,
    #[serde(default)]
    pub title: String,
    pub crawled_at: DateTime<Utc>,
    pub page_count: usize,
    pub endpoint_count: usize,
    pub schema_count: usize,
    #[serde(default)]
    pub failed_count: usize,
    #[serde(default)]
    pub failed_urls: Vec<String>,
    pub status: CrawlStatus,
}
