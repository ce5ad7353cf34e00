//! Tests for the extract module

use super::*;
use crate::config::HttpConfig;
use std::time::Duration;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SHEET: &str = "Timestamp,Street Address,Notes\n\
2024/05/01 10:00:00,2800 Kalmia Ave,\"standing water, backyard\"\n\
2024/05/02 11:30:00,1200 Pearl St,\n";

fn extractor() -> AddressExtractor {
    AddressExtractor::from_config(&HttpConfig::default()).unwrap()
}

#[test]
fn test_staging_path() {
    assert_eq!(
        staging_path(Path::new("data/raw_addresses.csv")),
        PathBuf::from("data/raw_addresses.csv.part")
    );
}

#[tokio::test]
async fn test_extract_writes_body_verbatim() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pub"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SHEET))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let dest = dir.path().join("raw_addresses.csv");

    let bytes = extractor()
        .extract(&format!("{}/pub", mock_server.uri()), &dest)
        .await
        .unwrap();

    assert_eq!(bytes, SHEET.len() as u64);
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), SHEET);
    assert!(!staging_path(&dest).exists());
}

#[tokio::test]
async fn test_extract_overwrites_previous_run() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pub"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SHEET))
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let dest = dir.path().join("raw_addresses.csv");
    std::fs::write(&dest, "stale contents from an older run, much longer than before\n").unwrap();

    extractor()
        .extract(&format!("{}/pub", mock_server.uri()), &dest)
        .await
        .unwrap();

    assert_eq!(std::fs::read_to_string(&dest).unwrap(), SHEET);
}

#[tokio::test]
async fn test_extract_creates_missing_directory() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pub"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SHEET))
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let dest = dir.path().join("nested").join("downloads").join("raw.csv");

    extractor()
        .extract(&format!("{}/pub", mock_server.uri()), &dest)
        .await
        .unwrap();

    assert!(dest.exists());
}

#[tokio::test]
async fn test_extract_server_error_does_not_create_file() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pub"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let dest = dir.path().join("raw_addresses.csv");

    let result = extractor()
        .extract(&format!("{}/pub", mock_server.uri()), &dest)
        .await;

    match result {
        Err(Error::ExtractionFailed { message, .. }) => assert!(message.contains("500")),
        other => panic!("expected ExtractionFailed, got {other:?}"),
    }
    assert!(!dest.exists());
    assert!(!staging_path(&dest).exists());
}

#[tokio::test]
async fn test_extract_server_error_keeps_existing_file() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pub"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let dest = dir.path().join("raw_addresses.csv");
    std::fs::write(&dest, SHEET).unwrap();

    let result = extractor()
        .extract(&format!("{}/pub", mock_server.uri()), &dest)
        .await;

    assert!(matches!(result, Err(Error::ExtractionFailed { .. })));
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), SHEET);
}

#[tokio::test]
async fn test_extract_not_found_is_extraction_failure() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pub"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let result = extractor()
        .extract(
            &format!("{}/pub", mock_server.uri()),
            dir.path().join("raw.csv"),
        )
        .await;

    assert!(matches!(result, Err(Error::ExtractionFailed { .. })));
}

#[tokio::test]
async fn test_extract_unreachable_host() {
    let uri = {
        let mock_server = MockServer::start().await;
        mock_server.uri()
    };

    let dir = tempdir().unwrap();
    let dest = dir.path().join("raw.csv");
    let result = extractor().extract(&format!("{uri}/pub"), &dest).await;

    assert!(matches!(result, Err(Error::ExtractionFailed { .. })));
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_extract_timeout() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pub"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(SHEET)
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let client = HttpClient::with_config(
        HttpClientConfig::builder()
            .timeout(Duration::from_millis(50))
            .build(),
    )
    .unwrap();

    let dir = tempdir().unwrap();
    let dest = dir.path().join("raw.csv");
    let result = AddressExtractor::new(client)
        .extract(&format!("{}/pub", mock_server.uri()), &dest)
        .await;

    assert!(matches!(result, Err(Error::ExtractionFailed { .. })));
    assert!(!dest.exists());
}
