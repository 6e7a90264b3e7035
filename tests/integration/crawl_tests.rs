//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full fetch → extract → store cycle end-to-end.

use apidoc_harvester::config::Config;
use apidoc_harvester::crawler::{Crawler, FetchError};
use apidoc_harvester::storage::{CrawlStatus, FileRepository, HttpMethod, Storage};
use apidoc_harvester::CrawlError;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with fast retries
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.crawler.request_timeout_secs = 5;
    config.retry.max_attempts = 3;
    config.retry.base_delay_ms = 10;
    config.user_agent.crawler_name = "TestBot".to_string();
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html")
}

async fn mount_page(server: &MockServer, page: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html(body))
        .mount(server)
        .await;
}

fn crawler(config: &Config, dir: &TempDir) -> (Crawler<FileRepository, apidoc_harvester::crawler::HttpFetcher>, Arc<FileRepository>) {
    let storage = Arc::new(FileRepository::new(dir.path()));
    let crawler = Crawler::from_config(config, Arc::clone(&storage)).expect("Failed to build crawler");
    (crawler, storage)
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<html><head><title>Home</title></head><body>
        <a href="/a">A</a>
        <a href="/b">B</a>
        <a href="https://elsewhere.example.org/docs">External</a>
        </body></html>"#,
    )
    .await;
    mount_page(
        &mock_server,
        "/a",
        r#"<html><head><title>A</title></head><body><a href="/b">B</a><a href="/">Home</a></body></html>"#,
    )
    .await;
    mount_page(
        &mock_server,
        "/b",
        r#"<html><head><title>B</title></head><body><a href="/a#top">A</a></body></html>"#,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let (crawler, storage) = crawler(&create_test_config(), &dir);

    let info = crawler
        .crawl(&format!("{}/", base_url), 50, 2)
        .await
        .expect("Crawl should succeed");

    assert_eq!(info.page_count, 3);
    assert_eq!(info.status, CrawlStatus::Complete);
    assert_eq!(info.title, "Home");
    assert_eq!(info.failed_count, 0);

    assert_eq!(storage.list_pages().unwrap().len(), 3);
    let stored_info = storage.get_site_info().unwrap().expect("SiteInfo should be written");
    assert_eq!(stored_info.page_count, 3);

    let page_a = storage
        .get_page(&format!("{}/a", base_url))
        .unwrap()
        .expect("Page /a should be stored");
    assert_eq!(page_a.title, "A");
    assert!(page_a.crawled_at.is_some());
    assert!(page_a.content.contains("<title>A</title>"));
}

#[tokio::test]
async fn test_page_limit_yields_partial() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<html><body><a href="/a">A</a><a href="/b">B</a></body></html>"#,
    )
    .await;
    mount_page(&mock_server, "/a", "<html><body>A</body></html>").await;
    mount_page(&mock_server, "/b", "<html><body>B</body></html>").await;

    let dir = TempDir::new().unwrap();
    let (crawler, storage) = crawler(&create_test_config(), &dir);

    let info = crawler.crawl(&mock_server.uri(), 1, 3).await.unwrap();

    assert_eq!(info.page_count, 1);
    assert_eq!(info.status, CrawlStatus::Partial);
    assert_eq!(storage.list_pages().unwrap().len(), 1);
}

#[tokio::test]
async fn test_server_error_is_retried_then_tallied() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<html><body><a href="/a">A</a><a href="/b">B</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/b", "<html><body>B</body></html>").await;

    let dir = TempDir::new().unwrap();
    let (crawler, storage) = crawler(&create_test_config(), &dir);

    let info = crawler.crawl(&base_url, 50, 3).await.unwrap();

    assert_eq!(info.page_count, 2);
    assert_eq!(info.failed_count, 1);
    assert_eq!(info.failed_urls, vec![format!("{}/a", base_url)]);
    assert_eq!(info.status, CrawlStatus::Complete);
    assert!(storage.get_page(&format!("{}/a", base_url)).unwrap().is_none());
    assert!(storage.get_page(&format!("{}/b", base_url)).unwrap().is_some());
}

#[tokio::test]
async fn test_seed_not_found_is_fatal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let (crawler, storage) = crawler(&create_test_config(), &dir);

    let err = crawler.crawl(&mock_server.uri(), 50, 3).await.unwrap_err();

    assert!(matches!(
        err,
        CrawlError::SeedFetch {
            source: FetchError::ClientError(404),
            ..
        }
    ));
    assert!(storage.get_site_info().unwrap().is_none());
    assert!(storage.list_pages().unwrap().is_empty());
}

#[tokio::test]
async fn test_non_html_page_is_not_stored() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<html><body><a href="/openapi.json">Spec</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/openapi.json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"{}".to_vec(), "application/json"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let (crawler, _storage) = crawler(&create_test_config(), &dir);

    let info = crawler.crawl(&base_url, 50, 3).await.unwrap();

    assert_eq!(info.page_count, 1);
    assert_eq!(info.failed_urls, vec![format!("{}/openapi.json", base_url)]);
}

#[tokio::test]
async fn test_skip_patterns_are_honoured() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<html><body><a href="/login">Log in</a><a href="/guide">Guide</a></body></html>"#,
    )
    .await;
    mount_page(&mock_server, "/guide", "<html><body>Guide</body></html>").await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(html("<html></html>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let (crawler, _storage) = crawler(&create_test_config(), &dir);

    let info = crawler.crawl(&mock_server.uri(), 50, 3).await.unwrap();
    assert_eq!(info.page_count, 2);
}

#[tokio::test]
async fn test_endpoints_and_schemas_are_extracted() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<html><head><title>Users API</title></head><body>
        <h2>GET /users/{id}</h2>
        <p>Retrieve a user by id.</p>
        <table>
          <tr><th>Name</th><th>Type</th><th>Description</th></tr>
          <tr><td>id</td><td>string</td><td>The user id</td></tr>
        </table>
        <h3>Responses</h3>
        <table>
          <tr><th>Status</th><th>Description</th></tr>
          <tr><td>200</td><td>The user</td></tr>
          <tr><td>404</td><td>No such user</td></tr>
        </table>
        <h2>The User object</h2>
        <p>A registered account.</p>
        <table>
          <tr><th>Field</th><th>Type</th><th>Description</th></tr>
          <tr><td>id</td><td>string</td><td>Identifier</td></tr>
          <tr><td>email</td><td>string</td><td>Login address</td></tr>
        </table>
        </body></html>"#,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let (crawler, storage) = crawler(&create_test_config(), &dir);

    let info = crawler.crawl(&base_url, 10, 1).await.unwrap();
    assert_eq!(info.endpoint_count, 1);
    assert_eq!(info.schema_count, 1);

    let page = storage
        .get_page(&format!("{}/", base_url))
        .unwrap()
        .expect("Seed page should be stored");
    assert_eq!(page.title, "Users API");

    let endpoint = &page.endpoints[0];
    assert_eq!(endpoint.method, HttpMethod::Get);
    assert_eq!(endpoint.path, "/users/{id}");
    assert_eq!(endpoint.description, "Retrieve a user by id.");
    assert_eq!(endpoint.parameters.len(), 1);
    assert_eq!(endpoint.parameters[0].name, "id");
    assert_eq!(endpoint.responses.len(), 2);
    assert_eq!(endpoint.responses["404"].description, "No such user");
    assert_eq!(endpoint.source_url, format!("{}/", base_url));

    let schema = &page.schemas[0];
    assert_eq!(schema.name, "User");
    assert_eq!(schema.properties.len(), 2);
}

#[tokio::test]
async fn test_recrawl_replaces_page() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<html><body><h2>GET /old</h2></body></html>"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/", "<html><body><h2>POST /new</h2></body></html>").await;

    let dir = TempDir::new().unwrap();
    let (crawler, storage) = crawler(&create_test_config(), &dir);

    crawler.crawl(&base_url, 5, 1).await.unwrap();
    crawler.crawl(&base_url, 5, 1).await.unwrap();

    let page = storage.get_page(&format!("{}/", base_url)).unwrap().unwrap();
    assert_eq!(page.endpoints.len(), 1);
    assert_eq!(page.endpoints[0].path, "/new");
    assert_eq!(storage.list_pages().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unwritable_record_is_tallied_and_crawl_continues() {
    let mock_server = MockServer::start().await;
    let long_path = format!("/{}", "a".repeat(300));

    mount_page(
        &mock_server,
        "/",
        &format!(
            r#"<html><head><title>Home</title></head><body>
            <a href="{}">Long</a><a href="/ok">Ok</a></body></html>"#,
            long_path
        ),
    )
    .await;
    mount_page(&mock_server, &long_path, "<html><body>Long</body></html>").await;
    mount_page(&mock_server, "/ok", "<html><body>Ok</body></html>").await;

    let dir = TempDir::new().unwrap();
    let (crawler, storage) = crawler(&create_test_config(), &dir);

    let info = crawler
        .crawl(&mock_server.uri(), 50, 2)
        .await
        .expect("A record that cannot be written should not abort the crawl");

    let long_url = format!("{}{}", mock_server.uri(), long_path);
    assert_eq!(info.page_count, 2);
    assert_eq!(info.failed_count, 1);
    assert_eq!(info.failed_urls, vec![long_url]);
    assert_eq!(info.status, CrawlStatus::Complete);

    assert!(storage
        .get_page(&format!("{}/ok", mock_server.uri()))
        .unwrap()
        .is_some());
    assert_eq!(storage.get_site_info().unwrap(), Some(info));
}
