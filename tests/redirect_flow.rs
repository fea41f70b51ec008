//! End-to-end tests: real listener, real file watcher, real HTTP client.

use std::time::Duration;

use reqwest::header::{HOST, LOCATION};
use reqwest::StatusCode;

mod common;

#[tokio::test]
async fn test_redirects_by_host() {
    let dir = tempfile::tempdir().unwrap();
    let service = common::start_service(common::write_rules(dir.path(), common::RULES_301)).await;
    let client = common::client();

    let res = client
        .get(service.url("/foo?x=1"))
        .header(HOST, "old.example.com")
        .send()
        .await
        .expect("service unreachable");

    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(res.headers()[LOCATION], "https://new.example.com/foo?x=1");

    service.stop().await.unwrap();
}

#[tokio::test]
async fn test_forwarded_host_and_unknown_host() {
    let dir = tempfile::tempdir().unwrap();
    let service = common::start_service(common::write_rules(dir.path(), common::RULES_301)).await;
    let client = common::client();

    let res = client
        .get(service.url("/bar"))
        .header("x-forwarded-host", "old.example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(res.headers()[LOCATION], "https://new.example.com/bar");

    let res = client
        .get(service.url("/bar"))
        .header("x-forwarded-host", "unknown.example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.text().await.unwrap(), "404 page not found\n");

    service.stop().await.unwrap();
}

#[tokio::test]
async fn test_healthz() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_rules(dir.path(), "[]\n");
    let service = common::start_service(path.clone()).await;
    let client = common::client();

    let res = client.get(service.url("/healthz")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Still healthy after a failed reload.
    std::fs::write(&path, "not: [valid").unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    let res = client.get(service.url("/healthz")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    service.stop().await.unwrap();
}

#[tokio::test]
async fn test_hot_reload_in_place_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_rules(dir.path(), common::RULES_301);
    let service = common::start_service(path.clone()).await;
    let client = common::client();

    std::fs::write(&path, common::RULES_308).unwrap();
    common::wait_for_version(&service.table, 2).await;

    let res = client
        .get(service.url("/foo"))
        .header("x-forwarded-host", "old.example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(res.headers()[LOCATION], "https://newer.example.com/foo");

    service.stop().await.unwrap();
}

#[tokio::test]
async fn test_hot_reload_atomic_replace() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_rules(dir.path(), common::RULES_301);
    let service = common::start_service(path.clone()).await;

    common::replace_rules(&path, common::RULES_308);
    common::wait_for_version(&service.table, 2).await;
    assert_eq!(service.table.lookup("old.example.com").unwrap().status, 308);

    // The watch was re-registered on the new file, so later edits still land.
    tokio::time::sleep(Duration::from_millis(200)).await;
    let version = service.table.version();
    common::replace_rules(&path, common::RULES_301);
    common::wait_for_version(&service.table, version + 1).await;
    assert_eq!(service.table.lookup("old.example.com").unwrap().status, 301);

    service.stop().await.unwrap();
}

#[tokio::test]
async fn test_invalid_reload_keeps_serving_last_good_rules() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_rules(dir.path(), common::RULES_301);
    let service = common::start_service(path.clone()).await;
    let client = common::client();

    std::fs::write(&path, "- from: old.example.com\n  to: 42\n  status: [oops]\n").unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert_eq!(service.table.version(), 1);
    let res = client
        .get(service.url("/foo?x=1"))
        .header("x-forwarded-host", "old.example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(res.headers()[LOCATION], "https://new.example.com/foo?x=1");

    let res = client
        .get(service.url("/"))
        .header("x-forwarded-host", "unknown.example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    service.stop().await.unwrap();
}

#[tokio::test]
async fn test_unrepresentable_status_fails_only_its_own_host() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_rules(dir.path(), common::RULES_301);
    let service = common::start_service(path.clone()).await;
    let client = common::client();

    common::replace_rules(
        &path,
        "- {from: old.example.com, to: 'https://newer.example.com', status: 308}\n\
         - {from: odd.example.com, to: 'https://odd.example.net', status: 1000}\n",
    );
    common::wait_for_version(&service.table, 2).await;

    let res = client
        .get(service.url("/foo"))
        .header("x-forwarded-host", "old.example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(res.headers()[LOCATION], "https://newer.example.com/foo");

    let res = client
        .get(service.url("/foo"))
        .header("x-forwarded-host", "odd.example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    service.stop().await.unwrap();
}
