// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{bare_image_server, create_test_app, record};
use axum::http::StatusCode;
use mediacrawl::domain::repositories::media_repository::MediaRepository;
use serde_json::{json, Value};
use std::collections::HashSet;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn image_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/img/a.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(vec![0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a]),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/img/broken"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;
    server
}

/// 空存储时随机端点返回 404
#[tokio::test]
async fn test_random_on_empty_store_is_404() {
    let app = create_test_app(&[]).await;

    let response = app.server.get("/media/random").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert!(body["error"].is_string());
}

/// 随机端点只返回存储中的资源ID
#[tokio::test]
async fn test_random_returns_stored_resource_id() {
    let records = vec![
        record("alice", "r1", "https://cdn.example.com/r1.jpg"),
        record("alice", "r2", "https://cdn.example.com/r2.jpg"),
        record("bob", "r3", "https://cdn.example.com/r3.jpg"),
    ];
    let app = create_test_app(&records).await;
    let known: HashSet<&str> = ["r1", "r2", "r3"].into_iter().collect();

    for _ in 0..10 {
        let response = app.server.get("/media/random").await;
        assert_eq!(response.status_code(), StatusCode::OK);

        let body: Value = response.json();
        let id = body["data"].as_str().unwrap();
        assert!(known.contains(id));
    }

    // Random picks do not evict
    assert_eq!(app.cache.len().await, 3);
}

/// 按ID代理图片，并且只服务一次
#[tokio::test]
async fn test_get_media_proxies_image_once() {
    let server = image_server().await;
    let records = vec![
        record("alice", "r1", &format!("{}/img/a.png", server.uri())),
        record("bob", "r2", "https://cdn.example.com/r2.jpg"),
    ];
    let app = create_test_app(&records).await;

    let response = app.server.get("/media/r1").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.header("content-type"), "image/png");
    assert_eq!(response.header("cache-control"), "public, max-age=3600");
    assert_eq!(
        response.as_bytes().to_vec(),
        vec![0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a]
    );

    // Evicted from the cache while "r2" keeps it populated
    let again = app.server.get("/media/r1").await;
    assert_eq!(again.status_code(), StatusCode::NOT_FOUND);

    // The store itself is untouched
    assert_eq!(app.repo.load().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_get_media_defaults_content_type() {
    let base = bare_image_server(&[0xff, 0xd8, 0xff]).await;
    let records = vec![record("bob", "r2", &format!("{}/img/plain", base))];
    let app = create_test_app(&records).await;

    let response = app.server.get("/media/r2").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.header("content-type"), "image/jpeg");
    assert_eq!(response.as_bytes().to_vec(), vec![0xff, 0xd8, 0xff]);
}

#[tokio::test]
async fn test_get_unknown_media_is_404() {
    let records = vec![record("alice", "r1", "https://cdn.example.com/r1.jpg")];
    let app = create_test_app(&records).await;

    let response = app.server.get("/media/nope").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("nope"));
}

/// 上游失败时返回通用的 500 错误，不泄露上游地址
#[tokio::test]
async fn test_upstream_failure_is_generic_500() {
    let server = image_server().await;
    let broken_url = format!("{}/img/broken", server.uri());
    let records = vec![
        record("alice", "r1", &broken_url),
        record("carol", "r9", "http://127.0.0.1:9/unreachable.jpg"),
    ];
    let app = create_test_app(&records).await;

    let response = app.server.get("/media/r1").await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body, json!({ "error": "Failed to fetch image" }));
    assert!(!response.text().contains(&broken_url));

    let response = app.server.get("/media/r9").await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

/// 统计端点：3 条记录，2 个用户
#[tokio::test]
async fn test_stats_counts_records_and_users() {
    let records = vec![
        record("alice", "r1", "https://cdn.example.com/r1.jpg"),
        record("alice", "r2", "https://cdn.example.com/r2.jpg"),
        record("bob", "r3", "https://cdn.example.com/r3.jpg"),
    ];
    let app = create_test_app(&records).await;

    let response = app.server.get("/media/stats").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(
        body,
        json!({
            "total_images": 3,
            "unique_users": 2,
            "users": ["alice", "bob"]
        })
    );

    // Stats read the store directly and never fill the cache
    assert_eq!(app.cache.len().await, 0);
}

#[tokio::test]
async fn test_stats_on_empty_store() {
    let app = create_test_app(&[]).await;

    let body: Value = app.server.get("/media/stats").await.json();

    assert_eq!(
        body,
        json!({ "total_images": 0, "unique_users": 0, "users": [] })
    );
}
