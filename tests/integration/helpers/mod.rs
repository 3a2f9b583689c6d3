// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::Router;
use axum_test::TestServer;
use chrono::Utc;
use mediacrawl::config::settings::DatabaseSettings;
use mediacrawl::domain::models::media::{MediaRecord, ResourceType};
use mediacrawl::domain::repositories::media_repository::MediaRepository;
use mediacrawl::domain::services::media_cache::MediaCache;
use mediacrawl::engines::image_proxy::ImageProxy;
use mediacrawl::infrastructure::database::connection;
use mediacrawl::infrastructure::repositories::media_repo_impl::SeaOrmMediaRepository;
use mediacrawl::presentation::routes;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use uuid::Uuid;

#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub repo: Arc<SeaOrmMediaRepository>,
    pub cache: Arc<MediaCache<SeaOrmMediaRepository>>,
}

/// 创建已迁移的 SQLite 内存数据库
pub async fn setup_db() -> Arc<DatabaseConnection> {
    let settings = DatabaseSettings {
        url: "sqlite::memory:".to_string(),
        max_connections: Some(1),
        min_connections: Some(1),
        connect_timeout: Some(5),
        idle_timeout: None,
    };

    let db = connection::create_pool(&settings)
        .await
        .expect("Failed to connect to sqlite");
    connection::run_migrations(&db)
        .await
        .expect("Failed to run migrations");
    Arc::new(db)
}

pub async fn setup_repo() -> Arc<SeaOrmMediaRepository> {
    Arc::new(SeaOrmMediaRepository::new(setup_db().await))
}

pub fn record(user_name: &str, resource_id: &str, resource_url: &str) -> MediaRecord {
    MediaRecord {
        id: Uuid::new_v4(),
        user_id: format!("{}-id", user_name),
        user_name: user_name.to_string(),
        resource_id: resource_id.to_string(),
        resource_url: resource_url.to_string(),
        resource_type: ResourceType::Image,
        created_at: Utc::now(),
    }
}

/// 组装完整路由，仓库中预先写入 `records`
pub async fn build_router(
    records: &[MediaRecord],
) -> (
    Router,
    Arc<SeaOrmMediaRepository>,
    Arc<MediaCache<SeaOrmMediaRepository>>,
) {
    let repo = setup_repo().await;
    if !records.is_empty() {
        repo.save(records).await.expect("Failed to seed records");
    }

    let cache = Arc::new(MediaCache::new(repo.clone(), None));
    let proxy = Arc::new(
        ImageProxy::new(Duration::from_secs(5), 3600, "image/jpeg")
            .expect("Failed to build image proxy"),
    );

    let app = routes::create_app(repo.clone(), cache.clone(), proxy);
    (app, repo, cache)
}

pub async fn create_test_app(records: &[MediaRecord]) -> TestApp {
    let (app, repo, cache) = build_router(records).await;
    let server = TestServer::new(app).expect("Failed to start test server");

    TestApp {
        server,
        repo,
        cache,
    }
}

/// 不带 content-type 头的图片服务，每个连接应答一次，返回基础 URL
pub async fn bare_image_server(body: &'static [u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let head = format!(
                    "HTTP/1.1 200 OK\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                    body.len()
                );
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(body).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{}", addr)
}
