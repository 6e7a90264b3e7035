//! Endpoint matchers
//!
//! Three conventions are recognised, tried in this order:
//!
//! - [`BlockMatcher`]: an element classed as an endpoint or operation that
//!   holds a method badge, a path and its own tables
//! - [`HeadingMatcher`]: a heading such as `GET /users/{id}` followed by its
//!   description and tables
//! - [`CodeLineMatcher`]: a paragraph or code block holding nothing but a
//!   method and a path

use crate::extract::section::{collect_section, collect_within, Section};
use crate::extract::table::{classify, parameters_from, read_table, responses_from, status_code, TableKind};
use crate::extract::text::{class_contains, element_text, heading_level, spaced_text};
use crate::extract::EndpointMatcher;
use crate::storage::{Endpoint, HttpMethod, Response};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use std::sync::OnceLock;

pub(crate) const BLOCK_CLASSES: &[&str] = &["endpoint", "operation", "api-method"];

/// Sections under a code line end at the next `h1`..`h3`
const CODE_LINE_STOP_LEVEL: u8 = 3;

fn endpoint_regex() -> &'static Regex {
    static ENDPOINT: OnceLock<Regex> = OnceLock::new();
    ENDPOINT.get_or_init(|| {
        Regex::new(r#"(?i)\b(GET|POST|PUT|PATCH|DELETE|HEAD|OPTIONS)\s+(?:https?://[^/\s]+)?(/[^\s"'<>/][^\s"'<>]*)"#)
            .expect("static regex")
    })
}

fn exact_endpoint_regex() -> &'static Regex {
    static EXACT: OnceLock<Regex> = OnceLock::new();
    EXACT.get_or_init(|| {
        Regex::new(r"(?i)^(GET|POST|PUT|PATCH|DELETE|HEAD|OPTIONS)\s+(?:https?://[^/\s]+)?(/[^\s/]\S*)$")
            .expect("static regex")
    })
}

fn clean_path(raw: &str) -> String {
    raw.trim_end_matches(|c: char| matches!(c, ',' | '.' | ';' | ':' | ')' | '`'))
        .to_string()
}

fn method_and_path(captures: regex::Captures<'_>) -> Option<(HttpMethod, String)> {
    let method = captures[1].parse::<HttpMethod>().ok()?;
    let path = clean_path(&captures[2]);
    // A bare "/" is prose ("Options / Settings"), not a route
    (!path.trim_matches('/').is_empty()).then_some((method, path))
}

/// Finds `METHOD /path` anywhere in a line of text
pub fn parse_endpoint_line(text: &str) -> Option<(HttpMethod, String)> {
    endpoint_regex().captures(text).and_then(method_and_path)
}

/// Matches text that is exactly `METHOD /path` and nothing else
pub fn parse_exact_endpoint_line(text: &str) -> Option<(HttpMethod, String)> {
    exact_endpoint_regex()
        .captures(text.trim())
        .and_then(method_and_path)
}

/// Builds an endpoint from the tables and text of its section
///
/// Response tables fill the response map; every other table describes
/// parameters. When a status appears twice the first row is kept.
fn build_endpoint(
    method: HttpMethod,
    path: String,
    description: Option<String>,
    section: &Section<'_>,
    source_url: &str,
) -> Endpoint {
    let mut parameters = Vec::new();
    let mut responses: BTreeMap<String, Response> = BTreeMap::new();

    for table in &section.tables {
        let parsed = read_table(&table.element);
        match classify(&table.element, &parsed, table.label.as_deref()) {
            TableKind::Responses => {
                for response in responses_from(&parsed) {
                    responses.entry(response.status.clone()).or_insert(response);
                }
            }
            TableKind::Parameters | TableKind::Properties | TableKind::Unknown => {
                for parameter in parameters_from(&parsed, method, &path) {
                    let duplicate = parameters.iter().any(|p: &crate::storage::Parameter| {
                        p.name == parameter.name && p.location == parameter.location
                    });
                    if !duplicate {
                        parameters.push(parameter);
                    }
                }
            }
        }
    }

    Endpoint {
        path,
        method,
        description: description
            .or_else(|| section.description.clone())
            .unwrap_or_default(),
        parameters,
        responses,
        source_url: source_url.to_string(),
    }
}

fn select_all<'a>(doc: &'a Html, selector: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(selector) {
        Ok(selector) => doc.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

fn select_within<'a>(element: &ElementRef<'a>, selector: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(selector) {
        Ok(selector) => element.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// Endpoint blocks: `<div class="endpoint">` and friends
///
/// Only the innermost block is used when blocks nest, so a page-level
/// `<section class="operations">` does not swallow its children.
#[derive(Debug, Default)]
pub struct BlockMatcher;

impl BlockMatcher {
    fn is_block(element: &ElementRef<'_>) -> bool {
        class_contains(element, BLOCK_CLASSES)
    }

    fn method_of(block: &ElementRef<'_>) -> Option<HttpMethod> {
        select_within(block, "code, span, strong, b, label, div")
            .iter()
            .filter(|e| e.id() != block.id())
            .find_map(|e| element_text(e).parse::<HttpMethod>().ok())
    }

    fn path_of(block: &ElementRef<'_>) -> Option<String> {
        select_within(block, "code, pre, span")
            .iter()
            .map(element_text)
            .find_map(|text| {
                let text = text.trim();
                if text.starts_with('/') && !text.contains(char::is_whitespace) {
                    return Some(clean_path(text));
                }
                let rest = text
                    .strip_prefix("https://")
                    .or_else(|| text.strip_prefix("http://"))?;
                let path = &rest[rest.find('/')?..];
                (!path.contains(char::is_whitespace)).then(|| clean_path(path))
            })
    }

    fn description_of(block: &ElementRef<'_>) -> Option<String> {
        select_within(block, "p, div")
            .iter()
            .filter(|e| e.id() != block.id())
            .find(|e| class_contains(e, &["description"]))
            .map(element_text)
            .filter(|text| !text.is_empty())
    }

    /// Responses written as `<div class="response"><code>404</code> ...</div>`
    fn response_blocks(block: &ElementRef<'_>) -> Vec<Response> {
        select_within(block, "div, li")
            .iter()
            .filter(|e| e.id() != block.id() && class_contains(e, &["response"]))
            .filter_map(|e| {
                let code = select_within(e, "code, span, strong, b, h4, h5")
                    .iter()
                    .map(element_text)
                    .filter(|text| text.len() <= 12)
                    .find_map(|text| status_code(&text))?;
                let description = select_within(e, "p")
                    .first()
                    .map(element_text)
                    .unwrap_or_else(|| {
                        element_text(e)
                            .replacen(&code, "", 1)
                            .trim()
                            .trim_start_matches(['-', ':'])
                            .trim()
                            .to_string()
                    });
                Some(Response {
                    status: code,
                    description,
                    example: None,
                })
            })
            .collect()
    }
}

impl EndpointMatcher for BlockMatcher {
    fn name(&self) -> &'static str {
        "block"
    }

    fn find(&self, doc: &Html, source_url: &str) -> Vec<Endpoint> {
        let blocks: Vec<ElementRef<'_>> = select_all(doc, "div, section, article")
            .into_iter()
            .filter(Self::is_block)
            .collect();

        blocks
            .iter()
            .filter(|block| {
                !blocks
                    .iter()
                    .any(|other| other.id() != block.id() && other.ancestors().any(|a| a.id() == block.id()))
            })
            .filter_map(|block| {
                let (method, path) = match (Self::method_of(block), Self::path_of(block)) {
                    (Some(method), Some(path)) => (method, path),
                    _ => parse_endpoint_line(&spaced_text(block))?,
                };

                let section = collect_within(*block);
                let mut endpoint = build_endpoint(
                    method,
                    path,
                    Self::description_of(block),
                    &section,
                    source_url,
                );
                for response in Self::response_blocks(block) {
                    endpoint
                        .responses
                        .entry(response.status.clone())
                        .or_insert(response);
                }
                Some(endpoint)
            })
            .collect()
    }
}

/// Headings that name an endpoint: `<h3>GET /users/{id}</h3>`
#[derive(Debug, Default)]
pub struct HeadingMatcher;

impl EndpointMatcher for HeadingMatcher {
    fn name(&self) -> &'static str {
        "heading"
    }

    fn find(&self, doc: &Html, source_url: &str) -> Vec<Endpoint> {
        select_all(doc, "h1, h2, h3, h4, h5, h6")
            .into_iter()
            .filter_map(|heading| {
                let (method, path) = parse_endpoint_line(&spaced_text(&heading))?;
                let level = heading_level(&heading)?;
                let section = collect_section(heading, level);
                Some(build_endpoint(method, path, None, &section, source_url))
            })
            .collect()
    }
}

/// Standalone lines: `<pre>POST /orders</pre>` or `<p><code>GET /items</code></p>`
#[derive(Debug, Default)]
pub struct CodeLineMatcher;

impl EndpointMatcher for CodeLineMatcher {
    fn name(&self) -> &'static str {
        "code-line"
    }

    fn find(&self, doc: &Html, source_url: &str) -> Vec<Endpoint> {
        select_all(doc, "p, pre")
            .into_iter()
            .filter_map(|line| {
                let (method, path) = parse_exact_endpoint_line(&spaced_text(&line))?;
                let section = collect_section(line, CODE_LINE_STOP_LEVEL);
                Some(build_endpoint(method, path, None, &section, source_url))
            })
            .collect()
    }
}
