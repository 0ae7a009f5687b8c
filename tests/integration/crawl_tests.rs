//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small catalog site and run the full
//! crawl and export cycle end-to-end.

use price_sweep::config::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use price_sweep::crawler::{crawl, Coordinator};
use price_sweep::output::{CsvExporter, Exporter};
use price_sweep::{CrawlPhase, SweepError};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock catalog
fn create_test_config(base_url: &str) -> Config {
    let mut config = Config {
        crawler: CrawlerConfig {
            timeout_ms: 2000,
            ..CrawlerConfig::default()
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: Some("https://example.com/contact".to_string()),
        },
        output: OutputConfig {
            directory: "unused".to_string(),
        },
        ..Config::default()
    };
    config.site.base_url = format!("{}/", base_url);
    config
}

fn listing_page(ids: &[u32], extra: &str) -> String {
    let items: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<li><a href="shirt.php?id={id}"><img src="img/shirts/shirt-{id}.jpg"></a></li>"#
            )
        })
        .collect();
    format!(
        r#"<html><body><a href="index.php">Home</a><ul class="products">{items}</ul>{extra}</body></html>"#
    )
}

fn product_page(id: u32, price: Option<&str>, extra: &str) -> String {
    let price = price
        .map(|p| format!(r#"<span class="price">{p}</span>"#))
        .unwrap_or_default();
    format!(
        r#"<html><body><div class="shirt-picture"><span><img src="img/shirts/shirt-{id}.jpg" alt="Shirt {id}"></span></div>
        <div class="shirt-details"><h1>{price} Shirt {id}</h1>
        <form><input type="hidden" name="item_name" value="Shirt {id}"></form></div>
        <a href="shirts.php">Back to shirts</a>{extra}</body></html>"#
    )
}

async fn mount_listing(server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path("/shirts.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_product(server: &MockServer, id: u32, body: String) {
    Mock::given(method("GET"))
        .and(path("/shirt.php"))
        .and(query_param("id", id.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

fn read_rows(file: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(file)
        .expect("Failed to open export");
    reader
        .records()
        .map(|row| row.unwrap().iter().map(str::to_string).collect())
        .collect()
}

fn assert_capture_time(value: &str) {
    let (hours, minutes) = value.split_once(':').expect("HH:MM");
    assert_eq!(hours.len(), 2);
    assert_eq!(minutes.len(), 2);
    assert!(hours.parse::<u32>().unwrap() < 24);
    assert!(minutes.parse::<u32>().unwrap() < 60);
}

#[tokio::test]
async fn test_full_crawl_three_products() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_listing(&mock_server, listing_page(&[101, 102, 103], "")).await;
    mount_product(&mock_server, 101, product_page(101, Some("$18"), "")).await;
    mount_product(&mock_server, 102, product_page(102, Some("$20"), "")).await;
    mount_product(&mock_server, 103, product_page(103, Some("$25"), "")).await;

    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("2024-01-15.csv");

    let outcome = crawl(
        create_test_config(&base_url),
        &destination,
        CancellationToken::new(),
    )
    .await
    .expect("Crawl should succeed");

    assert!(outcome.seed_fetched);
    assert_eq!(outcome.records, 3);
    assert_eq!(outcome.stats.pages_fetched, 4);
    assert_eq!(outcome.stats.listing_pages, 1);
    assert_eq!(outcome.stats.product_pages, 3);

    let rows = read_rows(&destination);
    assert_eq!(rows.len(), 3);

    let expected = [(101, "$18"), (102, "$20"), (103, "$25")];
    for (row, (id, price)) in rows.iter().zip(expected) {
        assert_eq!(row.len(), 5);
        assert_eq!(row[0], format!("Shirt {}", id));
        assert_eq!(row[1], price);
        assert_eq!(row[2], format!("img/shirts/shirt-{}.jpg", id));
        assert_eq!(row[3], format!("{}/shirt.php?id={}", base_url, id));
        assert_capture_time(&row[4]);
    }
}

#[tokio::test]
async fn test_missing_price_skips_product() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_listing(&mock_server, listing_page(&[101, 102, 103], "")).await;
    mount_product(&mock_server, 101, product_page(101, Some("$18"), "")).await;
    mount_product(&mock_server, 102, product_page(102, None, "")).await;
    mount_product(&mock_server, 103, product_page(103, Some("$25"), "")).await;

    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("out.csv");

    let outcome = crawl(
        create_test_config(&base_url),
        &destination,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(outcome.records, 2);
    assert_eq!(outcome.stats.incomplete_records, 1);

    let rows = read_rows(&destination);
    let names: Vec<&str> = rows.iter().map(|row| row[0].as_str()).collect();
    assert_eq!(names, vec!["Shirt 101", "Shirt 103"]);
}

#[tokio::test]
async fn test_seed_timeout_writes_empty_export() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/shirts.php"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page(&[101], ""))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&base_url);
    config.crawler.timeout_ms = 200;

    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("out.csv");

    let outcome = crawl(config, &destination, CancellationToken::new())
        .await
        .expect("An unreachable seed is not a crawl error");

    assert!(!outcome.seed_fetched);
    assert_eq!(outcome.records, 0);
    assert_eq!(outcome.stats.pages_fetched, 0);
    assert_eq!(outcome.stats.fetch_failures.get("timeout"), Some(&1));

    assert!(destination.exists());
    assert_eq!(std::fs::read(&destination).unwrap().len(), 0);
}

#[tokio::test]
async fn test_cyclic_links_fetch_each_page_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Every product links to every other product and back to the listing
    let siblings = r#"<a href="shirt.php?id=101">a</a><a href="shirt.php?id=102">b</a><a href="/shirt.php?id=103#top">c</a>"#;

    mount_listing(&mock_server, listing_page(&[101, 102, 103], siblings)).await;
    for id in [101, 102, 103] {
        mount_product(&mock_server, id, product_page(id, Some("$10"), siblings)).await;
    }

    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("out.csv");

    let outcome = crawl(
        create_test_config(&base_url),
        &destination,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(outcome.records, 3);
    assert_eq!(outcome.stats.pages_fetched, 4);
    assert_eq!(read_rows(&destination).len(), 3);
    // Each mock's expect(1) is verified when the server drops
}

#[tokio::test]
async fn test_off_site_and_failed_links() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let off_site = r#"<a href="http://catalog.invalid/shirt.php?id=900">Elsewhere</a>"#;
    mount_listing(&mock_server, listing_page(&[101, 104], off_site)).await;
    mount_product(&mock_server, 101, product_page(101, Some("$18"), "")).await;
    Mock::given(method("GET"))
        .and(path("/shirt.php"))
        .and(query_param("id", "104"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("out.csv");

    let outcome = crawl(
        create_test_config(&base_url),
        &destination,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(outcome.records, 1);
    assert_eq!(outcome.stats.fetch_failures.get("http_404"), Some(&1));
    assert_eq!(outcome.stats.total_failures(), 1);
}

#[tokio::test]
async fn test_expected_products_stops_early() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/shirts.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[101, 102, 103], "")))
        .mount(&mock_server)
        .await;
    for id in [101, 102, 103] {
        Mock::given(method("GET"))
            .and(path("/shirt.php"))
            .and(query_param("id", id.to_string()))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(product_page(id, Some("$10"), "")),
            )
            .mount(&mock_server)
            .await;
    }

    let mut config = create_test_config(&base_url);
    config.crawler.expected_products = Some(2);
    config.crawler.max_concurrent_fetches = 1;

    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("out.csv");

    let outcome = crawl(config, &destination, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.records, 2);

    let rows = read_rows(&destination);
    let names: Vec<&str> = rows.iter().map(|row| row[0].as_str()).collect();
    assert_eq!(names, vec!["Shirt 101", "Shirt 102"]);
}

#[tokio::test]
async fn test_export_only_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_listing(&mock_server, listing_page(&[101], "")).await;
    mount_product(&mock_server, 101, product_page(101, Some("$18"), "")).await;

    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("out.csv");

    let mut coordinator = Coordinator::new(create_test_config(&base_url)).unwrap();
    let outcome = coordinator.run(CancellationToken::new()).await.unwrap();
    assert_eq!(outcome.records, 1);
    assert_eq!(coordinator.phase(), CrawlPhase::Complete);

    let written = coordinator.export(&CsvExporter::new(), &destination).unwrap();
    assert_eq!(written, 1);
    assert_eq!(coordinator.phase(), CrawlPhase::Exported);

    let second = coordinator.export(&CsvExporter::new(), &dir.path().join("again.csv"));
    assert!(matches!(
        second,
        Err(SweepError::InvalidTransition {
            from: CrawlPhase::Exported,
            to: CrawlPhase::Exported
        })
    ));
    assert!(!dir.path().join("again.csv").exists());

    // A second run on the same coordinator is rejected too
    assert!(coordinator.run(CancellationToken::new()).await.is_err());
}

#[tokio::test]
async fn test_repeated_export_is_byte_identical() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_listing(&mock_server, listing_page(&[101, 102], "")).await;
    mount_product(&mock_server, 101, product_page(101, Some("$18"), "")).await;
    mount_product(&mock_server, 102, product_page(102, Some("$20"), "")).await;

    let dir = TempDir::new().unwrap();
    let mut coordinator = Coordinator::new(create_test_config(&base_url)).unwrap();
    coordinator.run(CancellationToken::new()).await.unwrap();

    let records = coordinator.state().aggregator.snapshot();
    let exporter = CsvExporter::new();
    let first = dir.path().join("first.csv");
    let second = dir.path().join("second.csv");
    exporter.export_all(&records, &first).unwrap();
    exporter.export_all(&records, &second).unwrap();

    assert_eq!(
        std::fs::read(&first).unwrap(),
        std::fs::read(&second).unwrap()
    );
}

#[tokio::test]
async fn test_redirect_onto_linked_product_exports_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_listing(&mock_server, listing_page(&[101, 102], "")).await;
    let location = format!("{}/shirt.php?id=102", base_url);
    Mock::given(method("GET"))
        .and(path("/shirt.php"))
        .and(query_param("id", "101"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", location.as_str()))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_product(&mock_server, 102, product_page(102, Some("$20"), "")).await;

    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("out.csv");

    let outcome = crawl(
        create_test_config(&base_url),
        &destination,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(outcome.records, 1);
    assert_eq!(outcome.stats.duplicates, 1);

    let rows = read_rows(&destination);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0], "Shirt 102");
    assert_eq!(rows[0][3], location);
}

#[tokio::test]
async fn test_cancel_mid_crawl_writes_nothing() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_listing(&mock_server, listing_page(&[101], "")).await;
    Mock::given(method("GET"))
        .and(path("/shirt.php"))
        .and(query_param("id", "101"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(product_page(101, Some("$18"), ""))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&base_url);
    config.crawler.timeout_ms = 10_000;

    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("out.csv");

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let result = crawl(config, &destination, cancel).await;

    assert!(matches!(result, Err(SweepError::Cancelled)));
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(!destination.exists());
}

