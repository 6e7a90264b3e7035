//! Markdown rendering
//!
//! This module renders stored records as human-readable markdown: a page
//! with its endpoints and schemas, or the site summary.

use crate::storage::{Endpoint, Page, Schema, SiteInfo};
use serde_json::Value;
use std::fmt::Write;

/// Escapes text for use inside a markdown table cell
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// Formats an endpoint as a level-3 section
pub fn format_endpoint_markdown(endpoint: &Endpoint) -> String {
    let mut md = String::new();

    let _ = writeln!(md, "### {} {}\n", endpoint.method, endpoint.path);
    if !endpoint.description.is_empty() {
        let _ = writeln!(md, "{}\n", endpoint.description);
    }

    if !endpoint.parameters.is_empty() {
        md.push_str("**Parameters**\n\n");
        md.push_str("| Name | In | Type | Required | Description |\n");
        md.push_str("|------|----|------|----------|-------------|\n");
        for parameter in &endpoint.parameters {
            let _ = writeln!(
                md,
                "| {} | {} | {} | {} | {} |",
                cell(&parameter.name),
                parameter.location,
                cell(&parameter.param_type),
                yes_no(parameter.required),
                cell(&parameter.description)
            );
        }
        md.push('\n');
    }

    if !endpoint.responses.is_empty() {
        md.push_str("**Responses**\n\n");
        md.push_str("| Status | Description |\n");
        md.push_str("|--------|-------------|\n");
        for (status, response) in &endpoint.responses {
            let description = match &response.example {
                Some(example) => format!("{} ({})", response.description, example),
                None => response.description.clone(),
            };
            let _ = writeln!(md, "| {} | {} |", status, cell(&description));
        }
        md.push('\n');
    }

    md
}

/// Splits a property definition into type, required flag and description
///
/// Definitions that are not the usual object are shown as compact JSON.
fn property_columns(definition: &Value) -> (String, bool, String) {
    match definition {
        Value::Object(map) => {
            let text = |key: &str| {
                map.get(key)
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string()
            };
            let required = map.get("required").and_then(Value::as_bool).unwrap_or(false);
            (text("type"), required, text("description"))
        }
        Value::String(s) => (s.clone(), false, String::new()),
        other => (String::new(), false, other.to_string()),
    }
}

/// Formats a schema as a level-3 section
pub fn format_schema_markdown(schema: &Schema) -> String {
    let mut md = String::new();

    let _ = writeln!(md, "### {}\n", schema.name);
    if !schema.description.is_empty() {
        let _ = writeln!(md, "{}\n", schema.description);
    }

    if !schema.properties.is_empty() {
        md.push_str("| Property | Type | Required | Description |\n");
        md.push_str("|----------|------|----------|-------------|\n");
        for (name, definition) in &schema.properties {
            let (property_type, required, description) = property_columns(definition);
            let _ = writeln!(
                md,
                "| {} | {} | {} | {} |",
                cell(name),
                cell(&property_type),
                yes_no(required),
                cell(&description)
            );
        }
        md.push('\n');
    }

    md
}

/// Formats a stored page with all its endpoints and schemas
pub fn format_page_markdown(page: &Page) -> String {
    let mut md = String::new();

    let _ = writeln!(md, "# {}\n", page.title);
    let _ = writeln!(md, "- **Source**: {}", page.url);
    if let Some(crawled_at) = page.crawled_at {
        let _ = writeln!(md, "- **Crawled**: {}", crawled_at.to_rfc3339());
    }
    md.push('\n');

    let _ = writeln!(md, "## Endpoints ({})\n", page.endpoints.len());
    if page.endpoints.is_empty() {
        md.push_str("No endpoints found on this page.\n\n");
    }
    for endpoint in &page.endpoints {
        md.push_str(&format_endpoint_markdown(endpoint));
    }

    let _ = writeln!(md, "## Schemas ({})\n", page.schemas.len());
    if page.schemas.is_empty() {
        md.push_str("No schemas found on this page.\n\n");
    }
    for schema in &page.schemas {
        md.push_str(&format_schema_markdown(schema));
    }

    md
}

/// Formats the site summary
pub fn format_site_info_markdown(info: &SiteInfo) -> String {
    let mut md = String::new();

    let _ = writeln!(md, "# {}\n", info.title);
    let _ = writeln!(md, "- **Base URL**: {}", info.base_url);
    let _ = writeln!(md, "- **Crawled**: {}", info.crawled_at.to_rfc3339());
    let _ = writeln!(md, "- **Status**: {}", info.status);
    let _ = writeln!(md, "- **Pages**: {}", info.page_count);
    let _ = writeln!(md, "- **Endpoints**: {}", info.endpoint_count);
    let _ = writeln!(md, "- **Schemas**: {}", info.schema_count);
    let _ = writeln!(md, "- **Failed pages**: {}", info.failed_count);

    if !info.failed_urls.is_empty() {
        md.push_str("\n## Failed URLs\n\n");
        for url in &info.failed_urls {
            let _ = writeln!(md, "- {}", url);
        }
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{CrawlStatus, HttpMethod, Parameter, ParameterLocation, Response};
    use chrono::Utc;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn sample_endpoint() -> Endpoint {
        let mut responses = BTreeMap::new();
        responses.insert(
            "200".to_string(),
            Response {
                status: "200".to_string(),
                description: "The user".to_string(),
                example: Some("User".to_string()),
            },
        );
        Endpoint {
            path: "/users/{id}".to_string(),
            method: HttpMethod::Get,
            description: "Fetch one user".to_string(),
            parameters: vec![Parameter {
                name: "id".to_string(),
                location: ParameterLocation::Path,
                param_type: "string".to_string(),
                required: true,
                description: "a | b".to_string(),
            }],
            responses,
            source_url: "https://docs.example.com/users".to_string(),
        }
    }

    #[test]
    fn test_format_endpoint() {
        let md = format_endpoint_markdown(&sample_endpoint());

        assert!(md.starts_with("### GET /users/{id}\n"));
        assert!(md.contains("Fetch one user"));
        assert!(md.contains("| id | path | string | yes | a \\| b |"));
        assert!(md.contains("| 200 | The user (User) |"));
    }

    #[test]
    fn test_format_schema() {
        let mut properties = BTreeMap::new();
        properties.insert(
            "email".to_string(),
            json!({"type": "string", "description": "Login", "required": true}),
        );
        properties.insert("tags".to_string(), json!(["a", "b"]));
        let schema = Schema {
            name: "User".to_string(),
            description: String::new(),
            properties,
            source_url: String::new(),
        };

        let md = format_schema_markdown(&schema);
        assert!(md.contains("| email | string | yes | Login |"));
        assert!(md.contains(r#"| tags |  | no | ["a","b"] |"#));
    }

    #[test]
    fn test_format_page() {
        let page = Page {
            title: "Users".to_string(),
            url: "https://docs.example.com/users".to_string(),
            endpoints: vec![sample_endpoint()],
            schemas: vec![],
            content: String::new(),
            crawled_at: Some(Utc::now()),
        };

        let md = format_page_markdown(&page);
        assert!(md.starts_with("# Users\n"));
        assert!(md.contains("## Endpoints (1)"));
        assert!(md.contains("## Schemas (0)"));
        assert!(md.contains("No schemas found on this page."));
    }

    #[test]
    fn test_format_site_info() {
        let info = SiteInfo {
            base_url: "https://docs.example.com/".to_string(),
            title: "Example Docs".to_string(),
            crawled_at: Utc::now(),
            page_count: 3,
            endpoint_count: 5,
            schema_count: 1,
            failed_count: 1,
            failed_urls: vec!["https://docs.example.com/x".to_string()],
            status: CrawlStatus::Partial,
        };

        let md = format_site_info_markdown(&info);
        assert!(md.contains("- **Status**: partial"));
        assert!(md.contains("## Failed URLs"));
        assert!(md.contains("- https://docs.example.com/x"));
    }
}
