//! Integration tests for the download pool
//!
//! Asset URLs point at a wiremock server; files are written into temporary
//! directories and checked byte for byte.

use shelf_harvest::config::Config;
use shelf_harvest::download::{run_download, DownloadError, DownloadPool, NoProgress, Outcome};
use shelf_harvest::storage::{open_store, CheckpointStore};
use shelf_harvest::{Checkpoint, CollectionKey, Record};
use std::fs;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn image_record(server: &MockServer, id: &str, label: &str) -> Record {
    Record::new(
        Some(id.to_string()),
        format!("{}/img/{}/s-l1600.jpg", server.uri(), id),
        Some(label.to_string()),
        1,
    )
}

async fn mount_image(server: &MockServer, id: &str, status: u16, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/img/{}/s-l1600.jpg", id)))
        .respond_with(ResponseTemplate::new(status).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

fn part_files(dir: &std::path::Path) -> usize {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".part"))
        .count()
}

#[tokio::test]
async fn test_failure_is_isolated_to_its_record() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let mut records = Vec::new();
    for i in 1..=5 {
        let id = format!("{}", 100 + i);
        let status = if i == 3 { 500 } else { 200 };
        mount_image(&server, &id, status, id.as_bytes()).await;
        records.push(image_record(&server, &id, &format!("Item {}", i)));
    }

    let pool = DownloadPool::new(reqwest::Client::new(), 2);
    let outcomes = pool.download_all(&records, dir.path(), &NoProgress).await;

    assert_eq!(outcomes.len(), 5);
    for (outcome, record) in outcomes.iter().zip(&records) {
        assert_eq!(outcome.record(), record);
    }
    assert_eq!(outcomes.iter().filter(|o| o.is_success()).count(), 4);
    assert!(matches!(
        outcomes[2],
        Outcome::Failure {
            reason: DownloadError::HttpStatus { status: 500 },
            ..
        }
    ));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 5);

    assert_eq!(fs::read(dir.path().join("Item_1.jpg")).unwrap(), b"101");
    assert_eq!(fs::read(dir.path().join("Item_5.jpg")).unwrap(), b"105");
    assert!(!dir.path().join("Item_3.jpg").exists());
    assert_eq!(part_files(dir.path()), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_same_label_records_do_not_corrupt_each_other() {
    const BODY_LEN: usize = 8 * 1024 * 1024;
    let server = MockServer::start().await;
    mount_image(&server, "201", 200, &vec![b'A'; BODY_LEN]).await;
    mount_image(&server, "202", 200, &vec![b'B'; BODY_LEN]).await;

    let records = vec![
        image_record(&server, "201", "Lamp"),
        image_record(&server, "202", "Lamp"),
    ];
    let pool = DownloadPool::new(reqwest::Client::new(), 2);

    for _ in 0..5 {
        let dir = TempDir::new().unwrap();
        let outcomes = pool.download_all(&records, dir.path(), &NoProgress).await;

        assert!(
            outcomes.iter().all(|o| o.is_success()),
            "{:?}",
            outcomes.iter().filter_map(|o| o.reason()).collect::<Vec<_>>()
        );

        // one of the two bodies wins whole
        let written = fs::read(dir.path().join("Lamp.jpg")).unwrap();
        assert_eq!(written.len(), BODY_LEN);
        assert!(written.iter().all(|b| *b == written[0]));
        assert_eq!(part_files(dir.path()), 0);
    }
}

#[tokio::test]
async fn test_concurrency_is_bounded_by_workers() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"x".to_vec())
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let records: Vec<Record> = (1..=4)
        .map(|i| image_record(&server, &i.to_string(), &format!("Slow {}", i)))
        .collect();

    let pool = DownloadPool::new(reqwest::Client::new(), 2);
    let started = Instant::now();
    let outcomes = pool.download_all(&records, dir.path(), &NoProgress).await;
    let elapsed = started.elapsed();

    assert!(outcomes.iter().all(|o| o.is_success()));
    // four 200ms responses through two workers take two rounds
    assert!(elapsed >= Duration::from_millis(400), "took {:?}", elapsed);
}

#[tokio::test]
async fn test_run_download_writes_into_collection_folder() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    let mut config = Config::default();
    config.output.root = root.path().to_string_lossy().into_owned();
    config.download.workers = 3;

    let key = CollectionKey::new(Some("acme"), None).unwrap();
    let store = open_store(&config.output);

    mount_image(&server, "1001", 200, b"lamp-bytes").await;
    mount_image(&server, "1002", 200, b"chair-bytes").await;

    let mut checkpoint = Checkpoint::new();
    checkpoint.push(image_record(&server, "1001", "Brass Lamp"));
    checkpoint.push(image_record(&server, "1002", "Oak Chair.png"));
    store.save(&key, &checkpoint).unwrap();

    let report = run_download(&config, &key, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.total(), 2);
    assert_eq!(report.success_count(), 2);

    let dir = root.path().join("acme");
    assert_eq!(fs::read(dir.join("Brass_Lamp.jpg")).unwrap(), b"lamp-bytes");
    assert_eq!(fs::read(dir.join("Oak_Chair.png")).unwrap(), b"chair-bytes");
    assert!(dir.join("file_info_list.csv").exists());

    // A second run overwrites the same files
    let again = run_download(&config, &key, CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(again.success_count(), 2);
    assert_eq!(part_files(&dir), 0);
    assert_eq!(fs::read(dir.join("Brass_Lamp.jpg")).unwrap(), b"lamp-bytes");
}

#[tokio::test]
async fn test_run_download_without_checkpoint() {
    let root = TempDir::new().unwrap();
    let mut config = Config::default();
    config.output.root = root.path().to_string_lossy().into_owned();

    let key = CollectionKey::new(None, Some("film camera")).unwrap();
    let report = run_download(&config, &key, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.total(), 0);
    assert!(!root.path().join("film_camera").exists());
}

#[tokio::test]
async fn test_cancelled_download_run() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    let mut config = Config::default();
    config.output.root = root.path().to_string_lossy().into_owned();

    let key = CollectionKey::new(Some("acme"), None).unwrap();
    let mut checkpoint = Checkpoint::new();
    checkpoint.push(image_record(&server, "1001", "Brass Lamp"));
    open_store(&config.output).save(&key, &checkpoint).unwrap();

    let token = CancellationToken::new();
    token.cancel();
    let report = run_download(&config, &key, token).await.unwrap();

    assert_eq!(report.failure_count(), 1);
    assert!(matches!(
        report.failures().next(),
        Some((_, DownloadError::Cancelled))
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}
