use std::fs;
use std::sync::Arc;

use chrono::NaiveDate;
use tempfile::TempDir;

use nightwatch::domain::models::{Hardware, RemoteConfig};
use nightwatch::domain::ports::{LogSelector, SourceReader};
use nightwatch::infrastructure::readers::{FallbackResolver, LocalReader, RemoteReader};

fn remote_config(server: &mockito::Server) -> RemoteConfig {
    RemoteConfig {
        api_base: format!("{}/api", server.url()),
        raw_base: format!("{}/raw", server.url()),
        token: None,
        timeout_secs: 5,
    }
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 8, 29).unwrap()
}

#[tokio::test]
async fn test_fetches_cron_log_from_raw_endpoint() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/raw/cron/cron_log/mi30x/2025-08-29/unit_test.log")
        .with_status(200)
        .with_body("Result: PASSED\n")
        .create_async()
        .await;

    let reader = RemoteReader::new(&remote_config(&server)).unwrap();
    let found = reader
        .find_log(Hardware::Mi30x, date(), &LogSelector::cron_log("unit_test"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(found.as_deref(), Some("Result: PASSED\n"));
}

#[tokio::test]
async fn test_missing_remote_log_is_a_miss() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/raw/cron/cron_log/mi35x/2025-08-29/pd_disagg.log")
        .with_status(404)
        .create_async()
        .await;

    let reader = RemoteReader::new(&remote_config(&server)).unwrap();
    let found = reader
        .find_log(Hardware::Mi35x, date(), &LogSelector::cron_log("pd_disagg"))
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_timing_summary_resolved_via_directory_listings() {
    let mut server = mockito::Server::new_async().await;

    // Two run directories match the date and the "online" suffix; the
    // lexicographically later one wins.
    server
        .mock("GET", "/api/online/deepseek-v3")
        .match_query(mockito::Matcher::UrlEncoded("ref".into(), "log".into()))
        .with_status(200)
        .with_body(
            r#"[
                {"name": "run_2025-08-29_01-00_online", "type": "dir"},
                {"name": "run_2025-08-29_07-30_online", "type": "dir"},
                {"name": "run_2025-08-29_07-30_online_torch_compile", "type": "dir"},
                {"name": "run_2025-08-28_23-00_online", "type": "dir"}
            ]"#,
        )
        .create_async()
        .await;
    server
        .mock("GET", "/api/online/deepseek-v3/run_2025-08-29_07-30_online")
        .match_query(mockito::Matcher::UrlEncoded("ref".into(), "log".into()))
        .with_status(200)
        .with_body(
            r#"[
                {"name": "timing_summary_073001.log", "type": "file"},
                {"name": "server.log", "type": "file"}
            ]"#,
        )
        .create_async()
        .await;
    let raw = server
        .mock(
            "GET",
            "/raw/online/deepseek-v3/run_2025-08-29_07-30_online/timing_summary_073001.log",
        )
        .with_status(200)
        .with_body("GSM8K accuracy: 0.95\n")
        .create_async()
        .await;

    let reader = RemoteReader::new(&remote_config(&server)).unwrap();
    let found = reader
        .find_log(
            Hardware::Mi30x,
            date(),
            &LogSelector::timing_summary(&["deepseek-v3"], "online"),
        )
        .await
        .unwrap();

    raw.assert_async().await;
    assert_eq!(found.as_deref(), Some("GSM8K accuracy: 0.95\n"));
}

#[tokio::test]
async fn test_listing_failure_degrades_to_miss() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/online/llama-70b")
        .match_query(mockito::Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let reader = RemoteReader::new(&remote_config(&server)).unwrap();
    let found = reader
        .find_log(
            Hardware::Mi30x,
            date(),
            &LogSelector::timing_summary(&["llama-70b"], "online"),
        )
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_list_dates_from_content_api() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/cron/cron_log/mi30x")
        .match_query(mockito::Matcher::UrlEncoded("ref".into(), "log".into()))
        .with_status(200)
        .with_body(
            r#"[
                {"name": "2025-08-29", "type": "dir"},
                {"name": "2025-08-27", "type": "dir"},
                {"name": "README.md", "type": "file"},
                {"name": "not-a-date", "type": "dir"}
            ]"#,
        )
        .create_async()
        .await;

    let reader = RemoteReader::new(&remote_config(&server)).unwrap();
    let dates = reader.list_dates(Hardware::Mi30x).await.unwrap();
    assert_eq!(
        dates,
        vec![
            NaiveDate::from_ymd_opt(2025, 8, 27).unwrap(),
            NaiveDate::from_ymd_opt(2025, 8, 29).unwrap(),
        ]
    );
}

#[tokio::test]
async fn test_resolver_falls_back_from_dead_remote_to_local() {
    // Remote endpoint answers 404 for everything; the local tree has the log.
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", mockito::Matcher::Any)
        .with_status(404)
        .create_async()
        .await;
    let remote = RemoteReader::new(&remote_config(&server)).unwrap();

    let root = TempDir::new().unwrap();
    let cron_dir = root.path().join("cron/cron_log/mi30x/2025-08-29");
    fs::create_dir_all(&cron_dir).unwrap();
    fs::write(cron_dir.join("unit_test.log"), "Result: PASSED\n").unwrap();
    let local = LocalReader::new(root.path());

    let resolver = FallbackResolver::new(vec![Arc::new(remote), Arc::new(local)]);
    let found = resolver
        .find_log(Hardware::Mi30x, date(), &LogSelector::cron_log("unit_test"))
        .await;
    assert_eq!(found.as_deref(), Some("Result: PASSED\n"));
}
