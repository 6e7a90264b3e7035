//! Table reading and row conversion
//!
//! Documentation sites put parameters, responses and schema properties in
//! tables. A table is read into header names plus text rows, classified by
//! its class, its label (the nearest heading or caption) and its headers,
//! and its rows are then converted into records.

use crate::extract::text::{class_contains, collapse_whitespace, element_text};
use crate::storage::{HttpMethod, Parameter, ParameterLocation, Response};
use regex::Regex;
use scraper::{ElementRef, Selector};
use serde_json::{Map, Value};
use std::sync::OnceLock;

const NAME_COLUMNS: &[&str] = &[
    "name",
    "parameter",
    "parameter name",
    "param",
    "field",
    "field name",
    "property",
    "attribute",
    "key",
    "argument",
];
const TYPE_COLUMNS: &[&str] = &["type", "data type", "datatype", "format"];
const LOCATION_COLUMNS: &[&str] = &["in", "location", "where"];
const REQUIRED_COLUMNS: &[&str] = &["required", "mandatory", "req", "req."];
const DESCRIPTION_COLUMNS: &[&str] = &[
    "description",
    "desc",
    "details",
    "notes",
    "comment",
    "meaning",
    "summary",
];
const STATUS_COLUMNS: &[&str] = &[
    "status",
    "code",
    "status code",
    "http code",
    "http status",
    "response code",
];
const EXAMPLE_COLUMNS: &[&str] = &["example", "schema", "model", "body", "response body", "returns"];

const RESPONSE_LABELS: &[&str] = &["response", "status code", "returns", "error"];
const PARAMETER_LABELS: &[&str] = &["param", "argument", "query", "header", "path variable", "request", "body"];
const PROPERTY_LABELS: &[&str] = &["propert", "field", "attribute", "schema", "model", "object"];

/// What a table documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Parameters,
    Responses,
    Properties,
    Unknown,
}

/// A table as text: lowercased header names and the data rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Index of the first header matching one of `names`
    ///
    /// Exact matches win; otherwise a header containing one of the longer
    /// names (four characters or more) is accepted.
    pub fn column(&self, names: &[&str]) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| names.contains(&h.as_str()))
            .or_else(|| {
                self.headers
                    .iter()
                    .position(|h| names.iter().any(|n| n.len() >= 4 && h.contains(n)))
            })
    }

    /// True if a header names the value type
    pub fn has_type_column(&self) -> bool {
        self.column(TYPE_COLUMNS).is_some()
    }

    fn has_headers(&self) -> bool {
        !self.headers.is_empty()
    }
}

/// Reads a `<table>` element
///
/// The first row made only of `<th>` cells becomes the header; every other
/// non-empty row is data.
pub fn read_table(table: &ElementRef<'_>) -> Table {
    let (Ok(row_selector), Ok(cell_selector)) = (Selector::parse("tr"), Selector::parse("th, td"))
    else {
        return Table::default();
    };

    let mut parsed = Table::default();
    for row in table.select(&row_selector) {
        let cells: Vec<ElementRef<'_>> = row.select(&cell_selector).collect();
        if cells.is_empty() {
            continue;
        }

        let header_row = cells.iter().all(|c| c.value().name() == "th");
        let texts: Vec<String> = cells.iter().map(element_text).collect();

        if header_row && !parsed.has_headers() && parsed.rows.is_empty() {
            parsed.headers = texts.into_iter().map(|t| t.to_lowercase()).collect();
        } else if texts.iter().any(|t| !t.is_empty()) {
            parsed.rows.push(texts);
        }
    }
    parsed
}

/// Decides what a table documents
///
/// Checked in order: the table's own class, the label preceding it, its
/// header names, and finally whether every first cell is a status code.
pub fn classify(table: &ElementRef<'_>, parsed: &Table, label: Option<&str>) -> TableKind {
    if class_contains(table, &["response", "status"]) {
        return TableKind::Responses;
    }
    if class_contains(table, &["param", "argument"]) {
        return TableKind::Parameters;
    }
    if class_contains(table, &["propert", "schema", "model", "field", "attribute"]) {
        return TableKind::Properties;
    }

    if let Some(label) = label.map(str::to_lowercase) {
        if RESPONSE_LABELS.iter().any(|l| label.contains(l)) {
            return TableKind::Responses;
        }
        if PARAMETER_LABELS.iter().any(|l| label.contains(l)) {
            return TableKind::Parameters;
        }
        if PROPERTY_LABELS.iter().any(|l| label.contains(l)) {
            return TableKind::Properties;
        }
    }

    let has_exact = |names: &[&str]| parsed.headers.iter().any(|h| names.contains(&h.as_str()));
    if has_exact(STATUS_COLUMNS) {
        return TableKind::Responses;
    }
    if has_exact(&["in", "location", "parameter", "param", "parameter name"]) {
        return TableKind::Parameters;
    }
    if has_exact(&["property", "field", "attribute", "field name"]) {
        return TableKind::Properties;
    }

    if !parsed.rows.is_empty()
        && parsed
            .rows
            .iter()
            .all(|row| row.first().and_then(|c| status_code(c)).is_some())
    {
        return TableKind::Responses;
    }

    TableKind::Unknown
}

fn cell(row: &[String], index: Option<usize>) -> &str {
    index
        .and_then(|i| row.get(i))
        .map(String::as_str)
        .unwrap_or("")
}

/// Column layout shared by parameter and property tables
struct FieldColumns {
    name: usize,
    field_type: Option<usize>,
    required: Option<usize>,
    description: Option<usize>,
}

impl FieldColumns {
    fn of(table: &Table, row_len: usize) -> Self {
        if table.has_headers() {
            let name = table.column(NAME_COLUMNS).unwrap_or(0);
            Self {
                name,
                field_type: table.column(TYPE_COLUMNS),
                required: table.column(REQUIRED_COLUMNS),
                description: table.column(DESCRIPTION_COLUMNS),
            }
        } else {
            // name | type | description, or name | description
            Self {
                name: 0,
                field_type: (row_len >= 3).then_some(1),
                required: None,
                description: (row_len >= 2).then_some(row_len - 1),
            }
        }
    }
}

/// Splits a name cell such as `id*` or `limit (optional)` into the bare
/// name and whether the cell itself marks it required
fn clean_name(raw: &str) -> (String, bool) {
    let marked = raw.contains('*') || is_required_text(raw);
    let name = raw
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or("")
        .trim_matches(|c: char| matches!(c, '*' | ':' | ',' | '`' | '"' | '\''))
        .to_string();
    (name, marked)
}

fn is_required_text(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("required") && !lower.contains("not required") && !lower.contains("optional")
}

fn is_truthy(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    matches!(lower.as_str(), "yes" | "y" | "true" | "required" | "✓" | "✔" | "x")
        || lower.starts_with("required")
}

/// Removes "required"/"optional" markers that share a cell with the type
fn clean_type(raw: &str) -> String {
    static MARKERS: OnceLock<Regex> = OnceLock::new();
    let markers = MARKERS.get_or_init(|| {
        Regex::new(r"(?i)\(?\b(required|optional)\b\)?,?").expect("static regex")
    });
    collapse_whitespace(markers.replace_all(raw, "").trim().trim_end_matches(','))
}

fn is_required(row: &[String], columns: &FieldColumns, name_marked: bool) -> bool {
    match columns.required {
        Some(index) => is_truthy(cell(row, Some(index))),
        None => name_marked || row.iter().skip(1).any(|c| is_required_text(c)),
    }
}

/// True if `name` is a placeholder in the path template:
/// `{id}`, `:id` or `<id>`
fn in_path_template(path: &str, name: &str) -> bool {
    path.contains(&format!("{{{}}}", name))
        || path.contains(&format!("<{}>", name))
        || path
            .split('/')
            .any(|segment| segment.strip_prefix(':') == Some(name))
}

/// Converts a parameter table into parameters of `method path`
///
/// Without a location column, parameters named in the path template are
/// `path`; the rest are `query` for methods without a body and `body`
/// otherwise.
pub fn parameters_from(table: &Table, method: HttpMethod, path: &str) -> Vec<Parameter> {
    let location_column = table.column(LOCATION_COLUMNS);
    let mut parameters: Vec<Parameter> = Vec::new();

    for row in &table.rows {
        let columns = FieldColumns::of(table, row.len());
        let (name, marked) = clean_name(cell(row, Some(columns.name)));
        if name.is_empty() {
            continue;
        }

        let location = ParameterLocation::parse(cell(row, location_column)).unwrap_or_else(|| {
            if in_path_template(path, &name) {
                ParameterLocation::Path
            } else if method.takes_query_arguments() {
                ParameterLocation::Query
            } else {
                ParameterLocation::Body
            }
        });

        if parameters
            .iter()
            .any(|p| p.name == name && p.location == location)
        {
            continue;
        }

        parameters.push(Parameter {
            required: location == ParameterLocation::Path || is_required(row, &columns, marked),
            param_type: clean_type(cell(row, columns.field_type)),
            description: cell(row, columns.description).to_string(),
            name,
            location,
        });
    }

    parameters
}

/// Extracts a status key from a cell: `200`, `4XX`, or `default`
pub fn status_code(text: &str) -> Option<String> {
    static STATUS: OnceLock<Regex> = OnceLock::new();
    let status = STATUS.get_or_init(|| {
        Regex::new(r"(?i)\b([1-5][0-9]{2}|[1-5]xx|default)\b").expect("static regex")
    });
    status
        .captures(text)
        .map(|c| c[1].to_uppercase().replace("DEFAULT", "default"))
}

/// Converts a response table into responses; rows without a status are dropped
pub fn responses_from(table: &Table) -> Vec<Response> {
    let (status_column, description_column, example_column) = if table.has_headers() {
        (
            table.column(STATUS_COLUMNS).unwrap_or(0),
            table.column(DESCRIPTION_COLUMNS),
            table.column(EXAMPLE_COLUMNS),
        )
    } else {
        (0, Some(1), Some(2))
    };

    table
        .rows
        .iter()
        .filter_map(|row| {
            let status = status_code(cell(row, Some(status_column)))?;
            let example = cell(row, example_column);
            Some(Response {
                status,
                description: cell(row, description_column).to_string(),
                example: (!example.is_empty()).then(|| example.to_string()),
            })
        })
        .collect()
}

/// Converts a property table into `(name, definition)` pairs
///
/// Definitions always carry `type`, `description` and `required`; any other
/// column is copied under its header name.
pub fn properties_from(table: &Table) -> Vec<(String, Value)> {
    let mut properties = Vec::new();

    for row in &table.rows {
        let columns = FieldColumns::of(table, row.len());
        let (name, marked) = clean_name(cell(row, Some(columns.name)));
        if name.is_empty() {
            continue;
        }

        let mut definition = Map::new();
        definition.insert(
            "type".to_string(),
            Value::String(clean_type(cell(row, columns.field_type))),
        );
        definition.insert(
            "description".to_string(),
            Value::String(cell(row, columns.description).to_string()),
        );
        definition.insert(
            "required".to_string(),
            Value::Bool(is_required(row, &columns, marked)),
        );

        let used = [
            Some(columns.name),
            columns.field_type,
            columns.required,
            columns.description,
        ];
        for (index, header) in table.headers.iter().enumerate() {
            if used.contains(&Some(index)) || header.is_empty() {
                continue;
            }
            let value = cell(row, Some(index));
            if !value.is_empty() && !definition.contains_key(header) {
                definition.insert(header.clone(), Value::String(value.to_string()));
            }
        }

        properties.push((name, Value::Object(definition)));
    }

    properties
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn table_of(html: &str) -> (Html, Table) {
        let doc = Html::parse_fragment(html);
        let parsed = {
            let selector = Selector::parse("table").unwrap();
            let table = doc.select(&selector).next().unwrap();
            read_table(&table)
        };
        (doc, parsed)
    }

    fn kind_of(html: &str, label: Option<&str>) -> TableKind {
        let doc = Html::parse_fragment(html);
        let selector = Selector::parse("table").unwrap();
        let table = doc.select(&selector).next().unwrap();
        let parsed = read_table(&table);
        classify(&table, &parsed, label)
    }

    #[test]
    fn test_read_table_headers_and_rows() {
        let (_doc, table) = table_of(
            "<table><thead><tr><th>Name</th><th>Type</th></tr></thead>
             <tbody><tr><td>id</td><td>string</td></tr><tr><td></td><td></td></tr></tbody></table>",
        );
        assert_eq!(table.headers, vec!["name", "type"]);
        assert_eq!(table.rows, vec![vec!["id".to_string(), "string".to_string()]]);
    }

    #[test]
    fn test_column_lookup() {
        let table = Table {
            headers: vec!["parameter".into(), "in".into(), "description text".into()],
            rows: vec![],
        };
        assert_eq!(table.column(NAME_COLUMNS), Some(0));
        assert_eq!(table.column(LOCATION_COLUMNS), Some(1));
        assert_eq!(table.column(DESCRIPTION_COLUMNS), Some(2));
        assert_eq!(table.column(TYPE_COLUMNS), None);
    }

    #[test]
    fn test_classify_by_class_label_and_headers() {
        assert_eq!(
            kind_of(r#"<table class="params"><tr><td>a</td></tr></table>"#, None),
            TableKind::Parameters
        );
        assert_eq!(
            kind_of("<table><tr><td>a</td></tr></table>", Some("Responses")),
            TableKind::Responses
        );
        assert_eq!(
            kind_of("<table><tr><th>Status</th><th>Description</th></tr></table>", None),
            TableKind::Responses
        );
        assert_eq!(
            kind_of("<table><tr><th>Property</th><th>Type</th></tr></table>", None),
            TableKind::Properties
        );
        assert_eq!(
            kind_of("<table><tr><td>200</td><td>OK</td></tr><tr><td>404</td><td>Missing</td></tr></table>", None),
            TableKind::Responses
        );
        assert_eq!(
            kind_of("<table><tr><td>id</td><td>string</td></tr></table>", None),
            TableKind::Unknown
        );
    }

    #[test]
    fn test_parameters_with_location_column() {
        let table = Table {
            headers: vec!["name".into(), "in".into(), "type".into(), "required".into(), "description".into()],
            rows: vec![vec!["X-Trace".into(), "header".into(), "string".into(), "no".into(), "Trace id".into()]],
        };
        let params = parameters_from(&table, HttpMethod::Get, "/users");
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].location, ParameterLocation::Header);
        assert!(!params[0].required);
        assert_eq!(params[0].description, "Trace id");
    }

    #[test]
    fn test_parameters_infer_location() {
        let table = Table {
            headers: vec!["name".into(), "type".into(), "description".into()],
            rows: vec![
                vec!["id".into(), "string".into(), "User id".into()],
                vec!["expand".into(), "boolean, optional".into(), "Expand relations".into()],
            ],
        };
        let params = parameters_from(&table, HttpMethod::Get, "/users/{id}");
        assert_eq!(params[0].location, ParameterLocation::Path);
        assert!(params[0].required);
        assert_eq!(params[1].location, ParameterLocation::Query);
        assert_eq!(params[1].param_type, "boolean");
        assert!(!params[1].required);

        let params = parameters_from(&table, HttpMethod::Post, "/users");
        assert_eq!(params[0].location, ParameterLocation::Body);
    }

    #[test]
    fn test_parameters_without_headers() {
        let table = Table {
            headers: vec![],
            rows: vec![vec!["limit*".into(), "integer".into(), "Page size".into()]],
        };
        let params = parameters_from(&table, HttpMethod::Get, "/items");
        assert_eq!(params[0].name, "limit");
        assert!(params[0].required);
        assert_eq!(params[0].param_type, "integer");
        assert_eq!(params[0].description, "Page size");
    }

    #[test]
    fn test_colon_path_placeholder() {
        assert!(in_path_template("/users/:id/posts", "id"));
        assert!(!in_path_template("/users/:identity", "id"));
        assert!(in_path_template("/users/<id>", "id"));
    }

    #[test]
    fn test_status_code() {
        assert_eq!(status_code("200 OK"), Some("200".to_string()));
        assert_eq!(status_code("4xx"), Some("4XX".to_string()));
        assert_eq!(status_code("Default"), Some("default".to_string()));
        assert_eq!(status_code("id"), None);
        assert_eq!(status_code("1234"), None);
    }

    #[test]
    fn test_responses_from_table() {
        let table = Table {
            headers: vec!["code".into(), "description".into(), "schema".into()],
            rows: vec![
                vec!["200".into(), "The user".into(), "User".into()],
                vec!["404".into(), "Not found".into(), "".into()],
                vec!["n/a".into(), "ignored".into(), "".into()],
            ],
        };
        let responses = responses_from(&table);
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].example.as_deref(), Some("User"));
        assert_eq!(responses[1].status, "404");
        assert_eq!(responses[1].example, None);
    }

    #[test]
    fn test_properties_keep_extra_columns() {
        let table = Table {
            headers: vec!["field".into(), "type".into(), "description".into(), "default".into()],
            rows: vec![vec!["email".into(), "string (required)".into(), "Login address".into(), "none".into()]],
        };
        let properties = properties_from(&table);
        assert_eq!(properties.len(), 1);

        let (name, definition) = &properties[0];
        assert_eq!(name, "email");
        assert_eq!(definition["type"], "string");
        assert_eq!(definition["required"], true);
        assert_eq!(definition["default"], "none");
    }
}
