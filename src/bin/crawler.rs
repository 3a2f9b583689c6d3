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

use anyhow::Context;
use mediacrawl::config::settings::{Settings, StorageBackend};
use mediacrawl::domain::repositories::media_repository::MediaRepository;
use mediacrawl::domain::services::crawl_service::{CrawlConfig, CrawlService};
use mediacrawl::engines::http_platform::HttpPlatformClient;
use mediacrawl::infrastructure::database::connection;
use mediacrawl::infrastructure::metrics::init_metrics;
use mediacrawl::infrastructure::repositories::media_repo_impl::SeaOrmMediaRepository;
use mediacrawl::infrastructure::storage::JsonFileMediaRepository;
use mediacrawl::utils::telemetry;
use mediacrawl::workers::crawl_worker::CrawlWorker;
use std::sync::Arc;
use tracing::{info, warn};

/// 爬虫入口
///
/// 单轮模式下抓取一次后退出；配置 `crawler.interval_secs` 后循环运行直到收到 Ctrl-C
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::new()?;

    telemetry::init_telemetry(settings.logging.json);
    info!("Starting mediacrawl crawler...");
    init_metrics(&settings.metrics);

    match settings.storage.backend {
        StorageBackend::Database => {
            let db = Arc::new(connection::create_pool(&settings.database).await?);
            connection::run_migrations(db.as_ref()).await?;
            crawl(Arc::new(SeaOrmMediaRepository::new(db)), &settings).await
        }
        StorageBackend::Json => {
            crawl(
                Arc::new(JsonFileMediaRepository::from_settings(&settings.storage)),
                &settings,
            )
            .await
        }
    }
}

async fn crawl<R>(repo: Arc<R>, settings: &Settings) -> anyhow::Result<()>
where
    R: MediaRepository + 'static,
{
    let config = CrawlConfig::from_settings(&settings.platform, &settings.crawler);
    if config.target_usernames.is_empty() {
        warn!("No target usernames configured");
    }

    let client = Arc::new(
        HttpPlatformClient::from_settings(&settings.platform)
            .context("Failed to build platform client")?,
    );
    let service = CrawlService::new(repo, client, config);
    let worker = CrawlWorker::new(service, settings.crawler.interval());

    worker
        .run_until(async {
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        })
        .await
        .context("Crawl failed")?;

    info!("Crawler finished");
    Ok(())
}
