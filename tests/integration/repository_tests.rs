//! Integration tests for the file repository and its read-side queries

use apidoc_harvester::storage::search::{
    find_endpoints_by_source, find_schemas_by_source, load_pages, search_endpoints,
    search_schemas,
};
use apidoc_harvester::storage::{
    open_storage, CrawlStatus, Endpoint, FileRepository, HttpMethod, Page, Parameter,
    ParameterLocation, Schema, SiteInfo, Storage, StorageError, SITE_INFO_FILE,
};
use chrono::Utc;
use serde_json::json;
use std::collections::BTreeMap;
use tempfile::TempDir;

fn endpoint(method: HttpMethod, path: &str, description: &str, source: &str) -> Endpoint {
    Endpoint {
        path: path.to_string(),
        method,
        description: description.to_string(),
        parameters: vec![Parameter {
            name: "id".to_string(),
            location: ParameterLocation::Path,
            param_type: "string".to_string(),
            required: true,
            description: "Identifier".to_string(),
        }],
        responses: BTreeMap::new(),
        source_url: source.to_string(),
    }
}

fn schema(name: &str, source: &str) -> Schema {
    let mut properties = BTreeMap::new();
    properties.insert(
        "id".to_string(),
        json!({"type": "string", "description": "Identifier", "required": true}),
    );
    Schema {
        name: name.to_string(),
        description: format!("The {} resource", name),
        properties,
        source_url: source.to_string(),
    }
}

fn page(url: &str, title: &str) -> Page {
    Page {
        title: title.to_string(),
        url: url.to_string(),
        endpoints: vec![],
        schemas: vec![],
        content: format!("<html><title>{}</title></html>", title),
        crawled_at: Some(Utc::now()),
    }
}

fn site_info(pages: usize) -> SiteInfo {
    SiteInfo {
        base_url: "https://docs.example.com/".to_string(),
        title: "Example".to_string(),
        crawled_at: Utc::now(),
        page_count: pages,
        endpoint_count: 0,
        schema_count: 0,
        failed_count: 0,
        failed_urls: vec![],
        status: CrawlStatus::Complete,
    }
}

#[test]
fn test_save_and_get_page() {
    let dir = TempDir::new().unwrap();
    let repo = open_storage(dir.path()).unwrap();

    let url = "https://docs.example.com/users";
    let mut stored = page(url, "Users");
    stored.endpoints.push(endpoint(HttpMethod::Get, "/users/{id}", "Get a user", url));
    stored.schemas.push(schema("User", url));
    repo.save_page(&stored).unwrap();

    let loaded = repo.get_page(url).unwrap().expect("page should exist");
    assert_eq!(loaded, stored);
}

#[test]
fn test_save_page_overwrites() {
    let dir = TempDir::new().unwrap();
    let repo = FileRepository::new(dir.path());

    let url = "https://docs.example.com/users";
    let mut first = page(url, "Users");
    first.endpoints.push(endpoint(HttpMethod::Get, "/users", "List", url));
    first.endpoints.push(endpoint(HttpMethod::Post, "/users", "Create", url));
    repo.save_page(&first).unwrap();

    let second = page(url, "Users v2");
    repo.save_page(&second).unwrap();

    let loaded = repo.get_page(url).unwrap().unwrap();
    assert_eq!(loaded.title, "Users v2");
    assert!(loaded.endpoints.is_empty());
    assert_eq!(repo.list_pages().unwrap().len(), 1);
}

#[test]
fn test_list_pages() {
    let dir = TempDir::new().unwrap();
    let repo = FileRepository::new(dir.path());

    for path in ["a", "b", "c"] {
        repo.save_page(&page(&format!("https://docs.example.com/{}", path), path))
            .unwrap();
    }
    repo.save_site_info(&site_info(3)).unwrap();

    let mut urls = repo.list_pages().unwrap();
    urls.sort();

    // Dots in the host come back as slashes: the mapping is lossy
    assert_eq!(
        urls,
        vec![
            "https://docs/example/com/a",
            "https://docs/example/com/b",
            "https://docs/example/com/c",
        ]
    );

    // Every listed URL still resolves to its page
    for url in &urls {
        assert!(repo.get_page(url).unwrap().is_some());
    }
}

#[test]
fn test_site_info_is_single_and_overwritten() {
    let dir = TempDir::new().unwrap();
    let repo = FileRepository::new(dir.path());

    assert!(repo.get_site_info().unwrap().is_none());

    repo.save_site_info(&site_info(1)).unwrap();
    let mut second = site_info(7);
    second.status = CrawlStatus::Partial;
    repo.save_site_info(&second).unwrap();

    let loaded = repo.get_site_info().unwrap().unwrap();
    assert_eq!(loaded.page_count, 7);
    assert_eq!(loaded.status, CrawlStatus::Partial);
    assert!(dir.path().join(SITE_INFO_FILE).is_file());
}

#[test]
fn test_site_info_without_added_fields_still_loads() {
    let dir = TempDir::new().unwrap();
    let repo = FileRepository::new(dir.path());

    std::fs::write(
        dir.path().join(SITE_INFO_FILE),
        r#"{
            "base_url": "https://docs.example.com/",
            "crawled_at": "2024-01-01T00:00:00Z",
            "page_count": 2,
            "endpoint_count": 5,
            "schema_count": 1,
            "status": "complete",
            "some_future_field": true
        }"#,
    )
    .unwrap();

    let info = repo.get_site_info().unwrap().unwrap();
    assert_eq!(info.page_count, 2);
    assert_eq!(info.failed_count, 0);
    assert!(info.title.is_empty());
}

#[test]
fn test_corrupt_records() {
    let dir = TempDir::new().unwrap();
    let repo = FileRepository::new(dir.path());

    let good = "https://docs.example.com/good";
    repo.save_page(&page(good, "Good")).unwrap();
    std::fs::write(dir.path().join("docs_example_com_bad.json"), "not json").unwrap();

    let err = repo
        .get_page("https://docs.example.com/bad")
        .unwrap_err();
    assert!(matches!(err, StorageError::Corrupt { .. }));
    assert!(err.is_corrupt());

    let stored = load_pages(&repo).unwrap();
    assert_eq!(stored.pages.len(), 1);
    assert_eq!(stored.skipped.len(), 1);
}

#[test]
fn test_search_and_source_queries() {
    let dir = TempDir::new().unwrap();
    let repo = FileRepository::new(dir.path());

    let users = "https://docs.example.com/users";
    let mut users_page = page(users, "Users");
    users_page
        .endpoints
        .push(endpoint(HttpMethod::Get, "/users/{id}", "Fetch a user", users));
    users_page.schemas.push(schema("User", users));
    repo.save_page(&users_page).unwrap();

    let orders = "https://docs.example.com/orders";
    let mut orders_page = page(orders, "Orders");
    orders_page
        .endpoints
        .push(endpoint(HttpMethod::Delete, "/orders/{id}", "Cancel an order", orders));
    orders_page.schemas.push(schema("Order", orders));
    repo.save_page(&orders_page).unwrap();

    let hits = search_endpoints(&repo, "USER").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].item.path, "/users/{id}");
    assert_eq!(hits[0].page_title, "Users");

    assert_eq!(search_endpoints(&repo, "delete").unwrap().len(), 1);
    assert_eq!(search_endpoints(&repo, "{id}").unwrap().len(), 2);
    assert!(search_endpoints(&repo, "invoice").unwrap().is_empty());

    let schemas = search_schemas(&repo, "order").unwrap();
    assert_eq!(schemas.len(), 1);
    assert_eq!(schemas[0].item.name, "Order");

    let by_source = find_endpoints_by_source(&repo, orders).unwrap();
    assert_eq!(by_source.len(), 1);
    assert_eq!(by_source[0].method, HttpMethod::Delete);
    assert_eq!(find_schemas_by_source(&repo, users).unwrap()[0].name, "User");
}

#[test]
fn test_colliding_urls_share_one_record() {
    let dir = TempDir::new().unwrap();
    let repo = FileRepository::new(dir.path());

    repo.save_page(&page("https://docs.example.com/users/list", "Slash"))
        .unwrap();
    repo.save_page(&page("https://docs.example.com/users-list", "Hyphen"))
        .unwrap();

    // Both names map to docs_example_com_users_list.json
    let urls = repo.list_pages().unwrap();
    assert_eq!(urls, vec!["https://docs/example/com/users/list"]);

    // Last write wins for either spelling
    let stored = repo.get_page(&urls[0]).unwrap().unwrap();
    assert_eq!(stored.title, "Hyphen");
    assert_eq!(stored.url, "https://docs.example.com/users-list");
    assert_eq!(
        repo.get_page("https://docs.example.com/users/list").unwrap().unwrap().title,
        "Hyphen"
    );
}
