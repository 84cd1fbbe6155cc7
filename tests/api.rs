//! Integration tests for the HTTP API.

use std::net::Ipv4Addr;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::{TestRequest, TestServer};
use serde_json::{json, Value};
use ttlbin::commands::serve::router;
use ttlbin::config::{Config, Storage, StorageKind};
use ttlbin::storage::MemoryStore;
use ttlbin::App;

fn test_config(test_mode: bool) -> Config {
    Config {
        base_url: "http://paste.test".into(),
        bind: Ipv4Addr::LOCALHOST.into(),
        port: 0,
        test_mode,
        storage: Storage {
            kind: StorageKind::Memory,
            #[cfg(feature = "sqlite")]
            sqlite: ttlbin::config::SqliteStorage {
                url: "sqlite::memory:".into(),
            },
        },
    }
}

fn setup_test_server(test_mode: bool) -> TestServer {
    let app = App::new(test_config(test_mode), MemoryStore::new());
    TestServer::new(router(app)).unwrap()
}

fn at(request: TestRequest, now_ms: &'static str) -> TestRequest {
    request.add_header(
        HeaderName::from_static("x-test-now-ms"),
        HeaderValue::from_static(now_ms),
    )
}

async fn create(server: &TestServer, body: Value, now_ms: &'static str) -> String {
    let response = at(server.post("/api/pastes"), now_ms).json(&body).await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let created: Value = response.json();
    created["id"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn test_create_and_read() {
    let server = setup_test_server(false);

    let response = server
        .post("/api/pastes")
        .json(&json!({ "content": "Hello, World!" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let created: Value = response.json();
    let id = created["id"].as_str().unwrap();
    assert_eq!(created["url"], format!("http://paste.test/p/{id}"));
    let location = format!("/p/{id}");
    response.assert_header("location", location.as_str());

    let response = server.get(&format!("/api/pastes/{id}")).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let paste: Value = response.json();
    assert_eq!(
        paste,
        json!({ "content": "Hello, World!", "remaining_views": null, "expires_at": null })
    );
}

#[tokio::test]
async fn test_ttl_scenario_with_test_clock() {
    let server = setup_test_server(true);
    let id = create(&server, json!({ "content": "hi", "ttl_seconds": 60 }), "1000").await;

    let response = at(server.get(&format!("/api/pastes/{id}")), "60999").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let paste: Value = response.json();
    assert_eq!(paste["content"], "hi");
    assert_eq!(paste["expires_at"], "1970-01-01T00:01:01.000Z");

    let response = at(server.get(&format!("/api/pastes/{id}")), "61000").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_clock_header_ignored_outside_test_mode() {
    let server = setup_test_server(false);
    let id = create(&server, json!({ "content": "hi", "ttl_seconds": 60 }), "1000").await;

    // creation used the wall clock, so the paste is still fresh
    let response = server.get(&format!("/api/pastes/{id}")).await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_view_cap() {
    let server = setup_test_server(false);
    let id = create(&server, json!({ "content": "twice", "max_views": 2 }), "0").await;

    let first: Value = server.get(&format!("/api/pastes/{id}")).await.json();
    assert_eq!(first["remaining_views"], 1);
    let second: Value = server.get(&format!("/api/pastes/{id}")).await.json();
    assert_eq!(second["remaining_views"], 0);

    let response = server.get(&format!("/api/pastes/{id}")).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_not_found_is_uniform() {
    let server = setup_test_server(true);
    let expired = create(&server, json!({ "content": "a", "ttl_seconds": 1 }), "0").await;
    let used = create(&server, json!({ "content": "b", "max_views": 1 }), "0").await;
    let response = at(server.get(&format!("/api/pastes/{used}")), "0").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let mut bodies = Vec::new();
    for path in [
        format!("/api/pastes/{expired}"),
        format!("/api/pastes/{used}"),
        "/api/pastes/doesnotexist".to_owned(),
    ] {
        let response = at(server.get(&path), "5000").await;
        bodies.push((response.status_code(), response.text()));
    }

    for (status, body) in &bodies {
        assert_eq!(*status, StatusCode::NOT_FOUND);
        assert_eq!(body, &bodies[0].1);
    }
}

#[tokio::test]
async fn test_validation_errors() {
    let server = setup_test_server(false);

    let cases = [
        (json!({ "content": "" }), "content"),
        (json!({ "content": 7 }), "content"),
        (json!({ "content": "hi", "ttl_seconds": 0 }), "ttl_seconds"),
        (json!({ "content": "hi", "ttl_seconds": 2.5 }), "ttl_seconds"),
        (json!({ "content": "hi", "max_views": -1 }), "max_views"),
        (json!({ "content": "hi", "max_views": "3" }), "max_views"),
        (json!({ "content": "hi", "max_views": u64::MAX }), "max_views"),
    ];

    for (body, field) in cases {
        let response = server.post("/api/pastes").json(&body).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "{body}");
        let error: Value = response.json();
        assert!(
            error["error"].as_str().unwrap().contains(field),
            "{body} -> {error}"
        );
    }
}

#[tokio::test]
async fn test_invalid_json() {
    let server = setup_test_server(false);
    let response = server.post("/api/pastes").text("{not json").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let error: Value = response.json();
    assert_eq!(error["error"], "invalid JSON body");
}

#[tokio::test]
async fn test_html_view_counts_as_view() {
    let server = setup_test_server(false);
    let id = create(&server, json!({ "content": "<b>bold</b>", "max_views": 1 }), "0").await;

    let response = server.get(&format!("/p/{id}")).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let html = response.text();
    assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
    assert!(html.contains("1 of 1 views"));
    assert!(html.contains("created "));

    let response = server.get(&format!("/p/{id}")).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert!(response.text().contains("Paste not found"));

    let response = server.get(&format!("/api/pastes/{id}")).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_healthz() {
    let server = setup_test_server(false);
    let response = server.get("/api/healthz").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({ "ok": true }));
}

#[tokio::test]
async fn test_index_serves_usage() {
    let server = setup_test_server(false);
    let response = server.get("/").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("POST /api/pastes"));
}

#[cfg(feature = "sqlite")]
#[tokio::test]
async fn test_sqlite_backed_app() {
    let mut config = test_config(true);
    config.storage.kind = StorageKind::Sqlite;
    let app = App::connect(config).await.unwrap();
    let server = TestServer::new(router(app)).unwrap();

    let response = server.get("/api/healthz").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let id = create(
        &server,
        json!({ "content": "stored", "ttl_seconds": 60, "max_views": 2 }),
        "1000",
    )
    .await;

    let response = at(server.get(&format!("/api/pastes/{id}")), "2000").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let paste: Value = response.json();
    assert_eq!(
        paste,
        json!({
            "content": "stored",
            "remaining_views": 1,
            "expires_at": "1970-01-01T00:01:01.000Z"
        })
    );

    let response = at(server.get(&format!("/p/{id}")), "2000").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = at(server.get(&format!("/api/pastes/{id}")), "2000").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
