// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{record, setup_repo};
use mediacrawl::domain::repositories::media_repository::MediaRepository;
use mediacrawl::domain::services::crawl_service::{CrawlConfig, CrawlError, CrawlService};
use mediacrawl::engines::http_platform::HttpPlatformClient;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(users: &[&str]) -> CrawlConfig {
    CrawlConfig {
        username: "bot".to_string(),
        password: "secret".to_string(),
        target_usernames: users.iter().map(|u| u.to_string()).collect(),
        new_user_limit: 20,
        existing_user_limit: 5,
    }
}

fn client(server: &MockServer) -> Arc<HttpPlatformClient> {
    Arc::new(HttpPlatformClient::new(&server.uri(), Duration::from_secs(5)).unwrap())
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v1/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "tok" })))
        .mount(server)
        .await;
}

async fn mount_user(server: &MockServer, username: &str, user_id: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/users/{}", username)))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": user_id })))
        .mount(server)
        .await;
}

fn media_page(resource_ids: &[&str]) -> serde_json::Value {
    json!([{
        "id": "post-1",
        "resources": resource_ids
            .iter()
            .map(|id| json!({
                "id": id,
                "thumbnail_url": format!("https://cdn.example.com/{}.jpg", id),
                "media_type": 1
            }))
            .collect::<Vec<_>>()
    }])
}

/// 已存在 {"a","b"}，抓取得到 ["a","c","d"]，只写入 {"c","d"}
#[tokio::test]
async fn test_crawl_persists_only_unseen_resources() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_user(&server, "x", "100").await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/100/media"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(media_page(&["a", "c", "d"])))
        .expect(1)
        .mount(&server)
        .await;

    let repo = setup_repo().await;
    repo.save(&[
        record("old", "a", "https://cdn.example.com/a.jpg"),
        record("old", "b", "https://cdn.example.com/b.jpg"),
    ])
    .await
    .unwrap();

    let service = CrawlService::new(repo.clone(), client(&server), config(&["x"]));
    let summary = service.run().await.unwrap();

    assert_eq!(summary.new_records, 2);
    let owned_by_x: HashSet<String> = repo
        .load()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.user_name == "x")
        .map(|r| r.resource_id)
        .collect();
    assert_eq!(
        owned_by_x,
        ["c", "d"]
            .iter()
            .map(|s| s.to_string())
            .collect::<HashSet<String>>()
    );
    assert!(repo.processed_users().await.unwrap().contains("x"));
}

/// 第二轮使用较小的抓取数量，且不会重复写入
#[tokio::test]
async fn test_second_pass_uses_existing_limit() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_user(&server, "x", "100").await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/100/media"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(media_page(&["a", "b"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/100/media"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(media_page(&["a", "b", "e"])))
        .expect(1)
        .mount(&server)
        .await;

    let repo = setup_repo().await;
    let service = CrawlService::new(repo.clone(), client(&server), config(&["x"]));

    let first = service.run().await.unwrap();
    let second = service.run().await.unwrap();

    assert_eq!(first.new_records, 2);
    assert_eq!(second.new_records, 1);
    assert_eq!(repo.load().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_unknown_user_is_skipped() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/ghost"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_user(&server, "y", "200").await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/200/media"))
        .respond_with(ResponseTemplate::new(200).set_body_json(media_page(&["y1"])))
        .mount(&server)
        .await;

    let repo = setup_repo().await;
    let service = CrawlService::new(repo.clone(), client(&server), config(&["ghost", "y"]));
    let summary = service.run().await.unwrap();

    assert_eq!(summary.users_failed, 1);
    assert_eq!(summary.users_processed, 1);
    let users = repo.processed_users().await.unwrap();
    assert!(users.contains("y"));
    assert!(!users.contains("ghost"));
}

#[tokio::test]
async fn test_rejected_login_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let repo = setup_repo().await;
    let service = CrawlService::new(repo.clone(), client(&server), config(&["x"]));
    let result = service.run().await;

    assert!(matches!(result, Err(CrawlError::Authentication(_))));
    assert!(repo.load().await.unwrap().is_empty());
    assert!(repo.processed_users().await.unwrap().is_empty());
}
