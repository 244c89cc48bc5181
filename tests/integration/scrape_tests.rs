//! Integration tests for the scraper
//!
//! These tests use wiremock to serve listing and detail pages and run the
//! full listing -> detail -> JSON file cycle end-to-end.

use action_scraper::config::Config;
use action_scraper::crawler::{Coordinator, Pacer, RetryPolicy};
use action_scraper::storage::{ActionRecord, StorageError, INDEX_FILE_NAME};
use action_scraper::{FetchError, RunPhase, ScraperError};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LISTING_PATH: &str = "/presidential-actions/";

/// Creates a test configuration pointing at the mock server
fn create_test_config(server: &MockServer, output: &Path) -> Config {
    let mut config = Config::default();
    config.scraper.base_url = format!("{}{}", server.uri(), LISTING_PATH);
    config.output.directory = output.to_string_lossy().into_owned();
    config
}

/// Builds an unpaced coordinator with a short retry delay
fn create_coordinator(config: Config) -> Coordinator {
    Coordinator::new(config)
        .expect("Failed to create coordinator")
        .with_pacer(Pacer::unpaced())
        .with_retry_policy(RetryPolicy::new(3, Duration::from_millis(10)))
}

fn listing_html(links: &[&str], next: Option<&str>) -> String {
    let items: String = links
        .iter()
        .map(|href| {
            format!(
                r#"<li class="wp-block-post"><h2 class="wp-block-post-title"><a href="{}">Action</a></h2></li>"#,
                href
            )
        })
        .collect();
    let pagination = next
        .map(|href| {
            format!(
                r#"<a class="wp-block-query-pagination-next" href="{}">Next Page</a>"#,
                href
            )
        })
        .unwrap_or_default();

    format!(
        r#"<html><head><title>Presidential Actions</title></head><body><main>
        <ul class="wp-block-post-template">{}</ul>
        <nav class="wp-block-query-pagination">{}</nav>
        </main></body></html>"#,
        items, pagination
    )
}

fn detail_html(title: &str, date: &str, category: &str, paragraphs: &[&str]) -> String {
    let body: String = paragraphs.iter().map(|p| format!("<p>{}</p>", p)).collect();
    format!(
        r#"<html><head><title>{title} | The White House</title></head><body>
        <div class="wp-block-whitehouse-topper">
          <div class="wp-block-whitehouse-topper__meta--byline">{category}</div>
          <h1>{title}</h1>
        </div>
        <div class="wp-block-post-date"><time datetime="2025-01-20">{date}</time></div>
        <div class="entry-content">{body}</div>
        </body></html>"#
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

/// Names of the record files in the output directory, sorted
fn record_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read output directory")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".json") && name != INDEX_FILE_NAME)
        .collect();
    names.sort();
    names
}

fn read_record(dir: &Path, identifier: &str) -> ActionRecord {
    let content = std::fs::read_to_string(dir.join(format!("{}.json", identifier)))
        .expect("Failed to read record file");
    serde_json::from_str(&content).expect("Failed to parse record file")
}

#[tokio::test]
async fn test_full_scrape_writes_one_file_per_action() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(html(listing_html(
            &[
                "/presidential-actions/2025/01/securing-our-borders/",
                "/presidential-actions/2025/01/national-energy-emergency/",
            ],
            None,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/presidential-actions/2025/01/securing-our-borders/"))
        .respond_with(html(detail_html(
            "Securing Our Borders",
            "January 20, 2025",
            "Executive Orders",
            &["By the authority vested in me.", "Sec. 1. Purpose."],
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/presidential-actions/2025/01/national-energy-emergency/"))
        .respond_with(html(detail_html(
            "Declaring a National Energy Emergency",
            "January 20, 2025",
            "Executive Orders",
            &["Energy is essential."],
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, output.path());
    let mut coordinator = create_coordinator(config);
    let stats = coordinator.run().await.expect("Scrape failed");

    assert_eq!(coordinator.phase(), RunPhase::Done);
    assert_eq!(stats.listing_pages, 1);
    assert_eq!(stats.detail_targets, 2);
    assert_eq!(stats.written, 2);
    assert!(stats.skipped.is_empty());

    assert_eq!(
        record_files(output.path()),
        vec![
            "national-energy-emergency.json".to_string(),
            "securing-our-borders.json".to_string(),
        ]
    );

    let record = read_record(output.path(), "securing-our-borders");
    assert_eq!(record.identifier, "securing-our-borders");
    assert_eq!(record.title, "Securing Our Borders");
    assert_eq!(record.date, "January 20, 2025");
    assert_eq!(record.category, "Executive Orders");
    assert_eq!(
        record.body,
        "By the authority vested in me.\n\nSec. 1. Purpose."
    );
    assert_eq!(
        record.source_url,
        format!(
            "{}/presidential-actions/2025/01/securing-our-borders/",
            mock_server.uri()
        )
    );

    // Exactly the six record fields, nothing else
    let raw = std::fs::read_to_string(output.path().join("securing-our-borders.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
    keys.sort();
    assert_eq!(
        keys,
        vec!["body", "category", "date", "identifier", "source_url", "title"]
    );

    let index: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(output.path().join(INDEX_FILE_NAME)).unwrap(),
    )
    .unwrap();
    assert_eq!(index["total_actions"], 2);
    assert_eq!(index["actions"][0]["identifier"], "securing-our-borders");
}

#[tokio::test]
async fn test_failed_detail_page_is_skipped() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(html(listing_html(
            &[
                "/presidential-actions/2025/02/missing/",
                "/presidential-actions/2025/02/present/",
            ],
            None,
        )))
        .mount(&mock_server)
        .await;

    // 404 is permanent: exactly one request, no retries
    Mock::given(method("GET"))
        .and(path("/presidential-actions/2025/02/missing/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/presidential-actions/2025/02/present/"))
        .respond_with(html(detail_html(
            "Present Action",
            "February 1, 2025",
            "Proclamations",
            &["Still here."],
        )))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, output.path());
    let stats = create_coordinator(config)
        .run()
        .await
        .expect("A skipped detail page must not fail the run");

    assert_eq!(stats.written, 1);
    assert_eq!(stats.fetch_failures(), 1);
    assert!(stats.skipped[0].url.ends_with("/2025/02/missing/"));
    assert_eq!(record_files(output.path()), vec!["present.json".to_string()]);
}

#[tokio::test]
async fn test_unparseable_detail_page_is_skipped() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(html(listing_html(
            &["/presidential-actions/2025/03/no-title/"],
            None,
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/presidential-actions/2025/03/no-title/"))
        .respond_with(html(
            r#"<html><body><div class="entry-content"><p>Body without heading.</p></div></body></html>"#
                .to_string(),
        ))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, output.path());
    let stats = create_coordinator(config).run().await.unwrap();

    assert_eq!(stats.written, 0);
    assert_eq!(stats.parse_failures(), 1);
    assert!(record_files(output.path()).is_empty());
}

#[tokio::test]
async fn test_first_listing_failure_is_fatal() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    // Retried up to the attempt budget, then the run fails
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, output.path());
    let result = create_coordinator(config).run().await;

    assert!(matches!(
        result,
        Err(ScraperError::Fetch(FetchError::Status { status: 500, .. }))
    ));
    assert!(record_files(output.path()).is_empty());
    assert!(!output.path().join(INDEX_FILE_NAME).exists());
}

#[tokio::test]
async fn test_first_listing_without_container_is_fatal() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(html("<html><body><p>Maintenance</p></body></html>".to_string()))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, output.path());
    let result = create_coordinator(config).run().await;

    assert!(matches!(result, Err(ScraperError::Parse(_))));
}

#[tokio::test]
async fn test_first_listing_with_generic_layout_is_fatal() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    // A page with the site chrome but no listing template
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(html(
            "<html><body><main><h1>Site maintenance</h1><p>Back soon</p></main></body></html>"
                .to_string(),
        ))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, output.path());
    let result = create_coordinator(config).run().await;

    assert!(matches!(result, Err(ScraperError::Parse(_))));
    assert!(record_files(output.path()).is_empty());
}

#[tokio::test]
async fn test_unwritable_output_aborts_before_listing() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let blocker = output.path().join("occupied");
    std::fs::write(&blocker, "not a directory").unwrap();

    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(html(listing_html(&[], None)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, &blocker);
    let result = create_coordinator(config).run().await;

    assert!(matches!(
        result,
        Err(ScraperError::Storage(StorageError::Prepare { .. }))
    ));
}

#[tokio::test]
async fn test_coordinator_can_run_twice() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(html(listing_html(
            &["/presidential-actions/2025/11/again/"],
            None,
        )))
        .expect(3)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/presidential-actions/2025/11/again/"))
        .respond_with(html(detail_html("Again", "November 2025", "", &["Text."])))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, output.path());
    let mut coordinator = create_coordinator(config);

    let targets = coordinator.discover().await.unwrap();
    assert_eq!(targets.len(), 1);

    let first = coordinator.run().await.expect("First run failed");
    let second = coordinator.run().await.expect("Second run failed");

    assert_eq!(first.written, 1);
    assert_eq!(second.written, 1);
    assert_eq!(second.listing_pages, 1);
    assert_eq!(coordinator.phase(), RunPhase::Done);
}

#[tokio::test]
async fn test_transient_detail_failure_is_retried() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(html(listing_html(
            &["/presidential-actions/2025/04/flaky/"],
            None,
        )))
        .mount(&mock_server)
        .await;

    // First request gets a 503, the next one succeeds
    Mock::given(method("GET"))
        .and(path("/presidential-actions/2025/04/flaky/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/presidential-actions/2025/04/flaky/"))
        .respond_with(html(detail_html(
            "Flaky Action",
            "April 1, 2025",
            "Memoranda",
            &["Eventually served."],
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, output.path());
    let stats = create_coordinator(config).run().await.unwrap();

    assert_eq!(stats.written, 1);
    assert!(stats.skipped.is_empty());
    assert_eq!(read_record(output.path(), "flaky").title, "Flaky Action");
}

#[tokio::test]
async fn test_pagination_across_listing_pages() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(html(listing_html(
            &["/presidential-actions/2025/05/first/"],
            Some("/presidential-actions/page/2/"),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/presidential-actions/page/2/"))
        .respond_with(html(listing_html(
            &["/presidential-actions/2025/04/second/"],
            None,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    for (slug, title) in [("2025/05/first", "First"), ("2025/04/second", "Second")] {
        Mock::given(method("GET"))
            .and(path(format!("/presidential-actions/{}/", slug)))
            .respond_with(html(detail_html(title, "May 2025", "", &["Text."])))
            .mount(&mock_server)
            .await;
    }

    let config = create_test_config(&mock_server, output.path());
    let stats = create_coordinator(config).run().await.unwrap();

    assert_eq!(stats.listing_pages, 2);
    assert_eq!(stats.written, 2);
    assert_eq!(
        record_files(output.path()),
        vec!["first.json".to_string(), "second.json".to_string()]
    );
    assert_eq!(read_record(output.path(), "second").category, "");
}

#[tokio::test]
async fn test_later_listing_failure_ends_pagination() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(html(listing_html(
            &["/presidential-actions/2025/06/kept/"],
            Some("/presidential-actions/page/2/"),
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/presidential-actions/page/2/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/presidential-actions/2025/06/kept/"))
        .respond_with(html(detail_html("Kept", "June 2025", "", &["Text."])))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, output.path());
    let stats = create_coordinator(config).run().await.unwrap();

    assert_eq!(stats.listing_pages, 1);
    assert_eq!(stats.written, 1);
}

#[tokio::test]
async fn test_max_pages_limits_pagination() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(html(listing_html(
            &["/presidential-actions/2025/07/only/"],
            Some("/presidential-actions/page/2/"),
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/presidential-actions/page/2/"))
        .respond_with(html(listing_html(&[], None)))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/presidential-actions/2025/07/only/"))
        .respond_with(html(detail_html("Only", "July 2025", "", &["Text."])))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server, output.path());
    config.scraper.max_pages = Some(1);
    let stats = create_coordinator(config).run().await.unwrap();

    assert_eq!(stats.listing_pages, 1);
    assert_eq!(stats.written, 1);
}

#[tokio::test]
async fn test_duplicate_links_are_fetched_once() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(html(listing_html(
            &["/presidential-actions/2025/08/repeated/"],
            Some("/presidential-actions/page/2/"),
        )))
        .mount(&mock_server)
        .await;

    // Same action again on page 2, with tracking noise
    Mock::given(method("GET"))
        .and(path("/presidential-actions/page/2/"))
        .respond_with(html(listing_html(
            &["/presidential-actions/2025/08/repeated/?utm_source=feed#content"],
            None,
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/presidential-actions/2025/08/repeated/"))
        .respond_with(html(detail_html("Repeated", "August 2025", "", &["Text."])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, output.path());
    let stats = create_coordinator(config).run().await.unwrap();

    assert_eq!(stats.links_found, 2);
    assert_eq!(stats.duplicates, 1);
    assert_eq!(stats.written, 1);
    assert_eq!(record_files(output.path()), vec!["repeated.json".to_string()]);
}

#[tokio::test]
async fn test_rerun_overwrites_with_identical_files() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(html(listing_html(
            &["/presidential-actions/2025/09/stable/"],
            None,
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/presidential-actions/2025/09/stable/"))
        .respond_with(html(detail_html("Stable", "September 2025", "", &["Same."])))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, output.path());
    create_coordinator(config.clone()).run().await.unwrap();
    let first = std::fs::read(output.path().join("stable.json")).unwrap();

    create_coordinator(config).run().await.unwrap();
    let second = std::fs::read(output.path().join("stable.json")).unwrap();

    assert_eq!(first, second);
    assert_eq!(record_files(output.path()).len(), 1);
}

#[tokio::test]
async fn test_discover_lists_targets_without_fetching_details() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(html(listing_html(
            &[
                "/presidential-actions/2025/10/alpha/",
                "/presidential-actions/2025/10/beta/",
            ],
            None,
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/presidential-actions/2025/10/alpha/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, output.path());
    let mut coordinator = create_coordinator(config);
    let targets = coordinator.discover().await.unwrap();

    let ids: Vec<_> = targets.iter().map(|t| t.identifier.as_str()).collect();
    assert_eq!(ids, vec!["alpha", "beta"]);
    assert_eq!(coordinator.phase(), RunPhase::CollectingDetails);
}
