// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use mediacrawl::config::settings::{Settings, StorageBackend};
use mediacrawl::domain::repositories::media_repository::MediaRepository;
use mediacrawl::domain::services::media_cache::MediaCache;
use mediacrawl::engines::image_proxy::ImageProxy;
use mediacrawl::infrastructure::database::connection;
use mediacrawl::infrastructure::metrics::init_metrics;
use mediacrawl::infrastructure::repositories::media_repo_impl::SeaOrmMediaRepository;
use mediacrawl::infrastructure::storage::JsonFileMediaRepository;
use mediacrawl::presentation::routes;
use mediacrawl::utils::telemetry;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

/// 主函数
///
/// API 服务入口：加载配置、初始化日志和指标、选择存储后端并启动 HTTP 服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration
    let settings = Settings::new()?;

    // 2. Initialize logging and metrics
    telemetry::init_telemetry(settings.logging.json);
    info!("Starting mediacrawl API server...");
    init_metrics(&settings.metrics);

    // 3. Select storage backend
    match settings.storage.backend {
        StorageBackend::Database => {
            let db = Arc::new(connection::create_pool(&settings.database).await?);
            info!("Database connection established");
            connection::run_migrations(db.as_ref()).await?;
            serve(Arc::new(SeaOrmMediaRepository::new(db)), &settings).await
        }
        StorageBackend::Json => {
            info!(dir = %settings.storage.json_dir, "Using JSON file storage");
            serve(
                Arc::new(JsonFileMediaRepository::from_settings(&settings.storage)),
                &settings,
            )
            .await
        }
    }
}

async fn serve<R>(repo: Arc<R>, settings: &Settings) -> anyhow::Result<()>
where
    R: MediaRepository + 'static,
{
    let cache = Arc::new(MediaCache::new(
        repo.clone(),
        settings.cache.max_age_secs.map(Duration::from_secs),
    ));
    let proxy = Arc::new(ImageProxy::from_settings(&settings.image_proxy)?);

    let app = routes::create_app(repo, cache, proxy);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
