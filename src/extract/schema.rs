//! Schema matchers

use crate::extract::endpoint::{parse_endpoint_line, BLOCK_CLASSES as ENDPOINT_BLOCK_CLASSES};
use crate::extract::section::{collect_section, collect_within, Section};
use crate::extract::table::{classify, properties_from, read_table, TableKind};
use crate::extract::text::{class_contains, element_text, heading_level, spaced_text};
use crate::extract::SchemaMatcher;
use crate::storage::Schema;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::OnceLock;

const BLOCK_CLASSES: &[&str] = &["schema", "model", "definition"];

/// Headings that introduce a section of a page rather than a type
const STOP_WORDS: &[&str] = &[
    "parameters",
    "responses",
    "request",
    "response",
    "examples",
    "example",
    "errors",
    "overview",
    "introduction",
    "authentication",
    "description",
    "properties",
    "fields",
    "attributes",
    "returns",
    "body",
    "headers",
    "notes",
];

const NAME_PREFIXES: &[&str] = &["schema:", "model:", "object:", "type:", "the "];
const NAME_SUFFIXES: &[&str] = &[" object", " schema", " model", " resource"];

fn identifier_regex() -> &'static Regex {
    static IDENTIFIER: OnceLock<Regex> = OnceLock::new();
    IDENTIFIER.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\-]*$").expect("static regex"))
}

/// Reduces heading text such as "The User object" to a type name
///
/// Returns `None` unless what remains is a single identifier that is not a
/// generic section title.
pub fn schema_name(text: &str) -> Option<String> {
    let mut name = text.trim();

    for prefix in NAME_PREFIXES {
        if let Some(rest) = name
            .get(..prefix.len())
            .filter(|head| head.eq_ignore_ascii_case(prefix))
            .and_then(|_| name.get(prefix.len()..))
        {
            name = rest.trim_start();
        }
    }
    for suffix in NAME_SUFFIXES {
        let cut = name.len().saturating_sub(suffix.len());
        if name.len() > suffix.len()
            && name.is_char_boundary(cut)
            && name[cut..].eq_ignore_ascii_case(suffix)
        {
            name = name[..cut].trim_end();
        }
    }
    let name = name.trim_matches(|c: char| matches!(c, '`' | ':' | '"' | '\''));

    let is_stop_word = STOP_WORDS.iter().any(|w| name.eq_ignore_ascii_case(w));
    (identifier_regex().is_match(name) && !is_stop_word).then(|| name.to_string())
}

/// Properties from a `<dl>`: `<dt>name (type)</dt><dd>description</dd>`
pub fn properties_from_definition_list(list: &ElementRef<'_>) -> Vec<(String, Value)> {
    static TYPED: OnceLock<Regex> = OnceLock::new();
    let typed = TYPED.get_or_init(|| Regex::new(r"^([^\s(]+)\s*\(([^)]*)\)").expect("static regex"));

    let mut properties = Vec::new();
    let mut current: Option<(String, String)> = None;

    let mut flush = |entry: Option<(String, String)>, description: String| {
        if let Some((name, property_type)) = entry {
            let required = description.to_lowercase().contains("required");
            let mut definition = Map::new();
            definition.insert("type".to_string(), Value::String(property_type));
            definition.insert("description".to_string(), Value::String(description));
            definition.insert("required".to_string(), Value::Bool(required));
            properties.push((name, Value::Object(definition)));
        }
    };

    for child in list.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "dt" => {
                flush(current.take(), String::new());
                let text = element_text(&child);
                current = match typed.captures(&text) {
                    Some(c) => Some((c[1].to_string(), c[2].trim().to_string())),
                    None => text
                        .split_whitespace()
                        .next()
                        .map(|name| (name.to_string(), String::new())),
                };
            }
            "dd" => flush(current.take(), element_text(&child)),
            _ => {}
        }
    }
    flush(current.take(), String::new());

    properties
}

/// Property map from the tables and lists of a section
///
/// `strict` accepts only tables that look like property listings: a
/// property table, or an unclassified one with a type column.
fn properties_of(section: &Section<'_>, strict: bool) -> Option<BTreeMap<String, Value>> {
    let mut properties = BTreeMap::new();
    let mut found = false;

    for table in &section.tables {
        let parsed = read_table(&table.element);
        let accepted = match classify(&table.element, &parsed, table.label.as_deref()) {
            TableKind::Properties => true,
            TableKind::Unknown => !strict || parsed.has_type_column(),
            TableKind::Parameters => !strict,
            TableKind::Responses => false,
        };
        if accepted {
            found = true;
            for (name, definition) in properties_from(&parsed) {
                properties.entry(name).or_insert(definition);
            }
        }
    }

    for list in &section.definition_lists {
        found = true;
        for (name, definition) in properties_from_definition_list(list) {
            properties.entry(name).or_insert(definition);
        }
    }

    found.then_some(properties)
}

/// Schema blocks: `<div class="schema">` with a heading naming the type
#[derive(Debug, Default)]
pub struct BlockMatcher;

impl BlockMatcher {
    fn name_of(block: &ElementRef<'_>) -> Option<String> {
        let selector = Selector::parse("h1, h2, h3, h4, h5, h6, code").ok()?;
        let first = block.select(&selector).next()?;
        schema_name(&element_text(&first))
    }
}

impl SchemaMatcher for BlockMatcher {
    fn name(&self) -> &'static str {
        "block"
    }

    fn find(&self, doc: &Html, source_url: &str) -> Vec<Schema> {
        let Ok(selector) = Selector::parse("div, section, article") else {
            return Vec::new();
        };
        let blocks: Vec<ElementRef<'_>> = doc
            .select(&selector)
            .filter(|e| class_contains(e, BLOCK_CLASSES))
            .collect();

        blocks
            .iter()
            .filter(|block| {
                !blocks
                    .iter()
                    .any(|other| other.id() != block.id() && other.ancestors().any(|a| a.id() == block.id()))
            })
            .filter_map(|block| {
                let name = Self::name_of(block)?;
                let section = collect_within(*block);
                Some(Schema {
                    name,
                    description: section.description.clone().unwrap_or_default(),
                    properties: properties_of(&section, false).unwrap_or_default(),
                    source_url: source_url.to_string(),
                })
            })
            .collect()
    }
}

/// Headings naming a type that are followed by a property table or a
/// definition list
#[derive(Debug, Default)]
pub struct HeadingMatcher;

impl SchemaMatcher for HeadingMatcher {
    fn name(&self) -> &'static str {
        "heading"
    }

    fn find(&self, doc: &Html, source_url: &str) -> Vec<Schema> {
        let Ok(selector) = Selector::parse("h1, h2, h3, h4, h5, h6") else {
            return Vec::new();
        };

        // Level of the endpoint heading whose section we are in, if any
        let mut endpoint_level: Option<u8> = None;
        let mut schemas = Vec::new();

        for heading in doc.select(&selector) {
            let Some(level) = heading_level(&heading) else {
                continue;
            };
            let text = spaced_text(&heading);

            if parse_endpoint_line(&text).is_some() {
                endpoint_level = Some(level);
                continue;
            }
            match endpoint_level {
                Some(outer) if level > outer => continue,
                _ => endpoint_level = None,
            }
            if inside_endpoint_block(&heading) {
                continue;
            }

            let Some(name) = schema_name(&text) else {
                continue;
            };
            let section = collect_section(heading, level);
            let Some(properties) = properties_of(&section, true) else {
                continue;
            };
            schemas.push(Schema {
                name,
                description: section.description.unwrap_or_default(),
                properties,
                source_url: source_url.to_string(),
            });
        }

        schemas
    }
}

/// Subheadings of an endpoint ("Arguments", "Query") describe its request,
/// not a type
fn inside_endpoint_block(heading: &ElementRef<'_>) -> bool {
    heading
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| class_contains(&ancestor, ENDPOINT_BLOCK_CLASSES))
}
