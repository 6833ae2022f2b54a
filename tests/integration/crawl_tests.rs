//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the storefront search endpoint
//! and check the full crawl cycle end-to-end, including the checkpoint file
//! left on disk.

use shelf_harvest::config::Config;
use shelf_harvest::crawler::{run_crawl, CrawlStatus, StopReason};
use shelf_harvest::storage::{open_store, CheckpointStore};
use shelf_harvest::{CollectionKey, HarvestError};
use std::fs;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH_PATH: &str = "/sch/i.html";

/// Creates a test configuration pointing at the mock server
fn create_test_config(server: &MockServer, root: &TempDir) -> Config {
    let mut config = Config::default();
    config.site.search_url = format!("{}{}", server.uri(), SEARCH_PATH);
    config.output.root = root.path().to_string_lossy().into_owned();
    config.crawler.request_timeout_ms = 5_000;
    config
}

fn seller() -> CollectionKey {
    CollectionKey::new(Some("acme"), None).unwrap()
}

/// Renders a result page in the item-list layout
fn item_page(items: &[(&str, &str)]) -> String {
    let rows: String = items
        .iter()
        .map(|(id, title)| {
            format!(
                r#"<li class="s-item">
                     <a href="https://www.ebay.com/itm/{id}"><div class="s-item__title">{title}</div></a>
                     <img src="https://i.ebayimg.com/thumbs/images/g/{id}/s-l225.jpg">
                   </li>"#
            )
        })
        .collect();
    format!("<html><body><ul class=\"srp-results\">{rows}</ul></body></html>")
}

/// Renders a result page in the card-grid layout
fn card_page(items: &[(&str, &str)]) -> String {
    let cards: String = items
        .iter()
        .map(|(id, title)| {
            format!(
                r#"<li class="s-card" data-listingid="{id}">
                     <div class="s-card__title">{title}</div>
                     <img src="https://i.ebayimg.com/images/g/{id}/s-l500.jpg">
                   </li>"#
            )
        })
        .collect();
    format!("<html><body><ul>{cards}</ul></body></html>")
}

fn empty_page() -> String {
    "<html><body><h3>No exact matches found</h3></body></html>".to_string()
}

async fn mount_page(server: &MockServer, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("_pgn", page.to_string().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Page numbers requested from the search endpoint, in order
async fn requested_pages(server: &MockServer) -> Vec<u32> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == SEARCH_PATH)
        .filter_map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "_pgn")
                .and_then(|(_, v)| v.parse().ok())
        })
        .collect()
}

#[tokio::test]
async fn test_crawl_until_empty_page() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();
    let config = create_test_config(&server, &root);

    mount_page(&server, 1, item_page(&[("1001", "Brass Lamp"), ("1002", "Oak Chair")])).await;
    mount_page(&server, 2, item_page(&[("1003", "Teak Desk")])).await;
    mount_page(&server, 3, empty_page()).await;

    let report = run_crawl(&config, seller(), false, CancellationToken::new())
        .await
        .expect("crawl should succeed");

    assert_eq!(
        report.status,
        CrawlStatus::Completed(StopReason::EmptyPage { page: 3 })
    );
    assert_eq!(report.records_after, 3);
    assert_eq!(requested_pages(&server).await, vec![1, 2, 3]);

    let csv_path = root.path().join("acme").join("file_info_list.csv");
    let content = fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "id,url,name,page");
    assert_eq!(
        lines[1],
        "1001,https://i.ebayimg.com/images/g/1001/s-l1600.jpg,Brass Lamp,1"
    );
    assert_eq!(lines.len(), 4);
    assert!(lines[3].ends_with(",Teak Desk,2"));
}

#[tokio::test]
async fn test_search_parameters_sent() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();
    let mut config = create_test_config(&server, &root);
    config.crawler.page_size = Some(240);

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("_ssn", "acme"))
        .and(query_param("_nkw", "desk lamp"))
        .and(query_param("_ipg", "240"))
        .respond_with(ResponseTemplate::new(200).set_body_string(empty_page()))
        .expect(1)
        .mount(&server)
        .await;

    let key = CollectionKey::new(Some("acme"), Some("desk  lamp")).unwrap();
    let report = run_crawl(&config, key, false, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.records_after, 0);
    // Empty runs still leave a checkpoint behind
    assert!(root.path().join("acme").join("file_info_list.csv").exists());
}

#[tokio::test]
async fn test_second_run_resumes_and_adds_nothing() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();
    let config = create_test_config(&server, &root);

    mount_page(&server, 1, item_page(&[("1001", "Brass Lamp"), ("1002", "Oak Chair")])).await;
    mount_page(&server, 2, item_page(&[("1003", "Teak Desk")])).await;
    mount_page(&server, 3, empty_page()).await;

    run_crawl(&config, seller(), false, CancellationToken::new())
        .await
        .unwrap();
    let before = fs::read_to_string(root.path().join("acme").join("file_info_list.csv")).unwrap();

    let report = run_crawl(&config, seller(), false, CancellationToken::new())
        .await
        .unwrap();
    let after = fs::read_to_string(root.path().join("acme").join("file_info_list.csv")).unwrap();

    assert_eq!(report.first_page, 2);
    assert_eq!(report.records_added(), 0);
    assert_eq!(before, after);
    // second run starts at the last recorded page
    assert_eq!(requested_pages(&server).await, vec![1, 2, 3, 2, 3]);
}

#[tokio::test]
async fn test_new_listings_picked_up_on_resume() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();
    let config = create_test_config(&server, &root);

    let store = open_store(&config.output);
    let key = seller();

    mount_page(&server, 1, item_page(&[("1001", "Brass Lamp")])).await;
    mount_page(&server, 2, item_page(&[("1002", "Oak Chair"), ("1003", "Teak Desk")])).await;
    mount_page(&server, 3, item_page(&[("1004", "Wool Rug")])).await;
    mount_page(&server, 4, empty_page()).await;

    // Seed a checkpoint as if a previous run was interrupted after page 2's first item
    let mut prior = shelf_harvest::Checkpoint::new();
    prior.push(shelf_harvest::Record::new(
        Some("1001".into()),
        "https://i.ebayimg.com/images/g/1001/s-l1600.jpg",
        Some("Brass Lamp".into()),
        1,
    ));
    prior.push(shelf_harvest::Record::new(
        Some("1002".into()),
        "https://i.ebayimg.com/images/g/1002/s-l1600.jpg",
        Some("Oak Chair".into()),
        2,
    ));
    store.save(&key, &prior).unwrap();

    let report = run_crawl(&config, key.clone(), false, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(requested_pages(&server).await, vec![2, 3, 4]);
    assert_eq!(report.records_added(), 2);

    let ids: Vec<String> = store
        .load(&key)
        .unwrap()
        .records()
        .iter()
        .filter_map(|r| r.id().map(str::to_string))
        .collect();
    assert_eq!(ids, vec!["1001", "1002", "1003", "1004"]);
}

#[tokio::test]
async fn test_fallback_to_card_layout() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();
    let config = create_test_config(&server, &root);

    mount_page(&server, 1, card_page(&[("2001", "Floor Lamp"), ("2002", "Side Table")])).await;
    mount_page(&server, 2, card_page(&[("2003", "Bookcase")])).await;
    mount_page(&server, 3, empty_page()).await;

    let report = run_crawl(&config, seller(), false, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.records_after, 3);
    let checkpoint = open_store(&config.output).load(&seller()).unwrap();
    let first = &checkpoint.records()[0];
    assert_eq!(first.id(), Some("2001"));
    assert_eq!(first.label(), Some("Floor Lamp"));
    assert_eq!(
        first.asset_url(),
        "https://i.ebayimg.com/images/g/2001/s-l1600.jpg"
    );
}

#[tokio::test]
async fn test_page_error_keeps_earlier_progress() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();
    let config = create_test_config(&server, &root);

    mount_page(&server, 1, item_page(&[("1001", "Brass Lamp")])).await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("_pgn", "2"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = run_crawl(&config, seller(), false, CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        HarvestError::Extraction {
            page: 2,
            records: 1,
            ..
        }
    ));
    let checkpoint = open_store(&config.output).load(&seller()).unwrap();
    assert_eq!(checkpoint.len(), 1);
    assert_eq!(checkpoint.records()[0].id(), Some("1001"));
}

#[tokio::test]
async fn test_interrupted_run_persists_and_reports() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();
    let config = create_test_config(&server, &root);
    mount_page(&server, 1, item_page(&[("1001", "Brass Lamp")])).await;

    let token = CancellationToken::new();
    token.cancel();

    let report = run_crawl(&config, seller(), false, token).await.unwrap();

    assert_eq!(report.status, CrawlStatus::Interrupted);
    assert!(requested_pages(&server).await.is_empty());
    let content = fs::read_to_string(root.path().join("acme").join("file_info_list.csv")).unwrap();
    assert_eq!(content.trim(), "id,url,name,page");
}

#[tokio::test]
async fn test_corrupt_checkpoint_is_not_overwritten() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();
    let config = create_test_config(&server, &root);
    mount_page(&server, 1, item_page(&[("1001", "Brass Lamp")])).await;

    let dir = root.path().join("acme");
    fs::create_dir_all(&dir).unwrap();
    let csv_path = dir.join("file_info_list.csv");
    let corrupt = "id,url,name,page\n1001,https://img/a.jpg,Lamp,first\n";
    fs::write(&csv_path, corrupt).unwrap();

    let err = run_crawl(&config, seller(), false, CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.is_corrupt_checkpoint());
    assert!(requested_pages(&server).await.is_empty());
    assert_eq!(fs::read_to_string(&csv_path).unwrap(), corrupt);
}

#[tokio::test]
async fn test_fresh_run_replaces_checkpoint() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();
    let config = create_test_config(&server, &root);

    mount_page(&server, 1, item_page(&[("1005", "Glass Vase")])).await;
    mount_page(&server, 2, empty_page()).await;

    let dir = root.path().join("acme");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("file_info_list.csv"),
        "id,url,name,page\n9,https://img/old.jpg,Old,7\n",
    )
    .unwrap();

    let report = run_crawl(&config, seller(), true, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.first_page, 1);
    let checkpoint = open_store(&config.output).load(&seller()).unwrap();
    assert_eq!(checkpoint.len(), 1);
    assert_eq!(checkpoint.records()[0].id(), Some("1005"));
}
