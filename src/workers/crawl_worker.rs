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

use crate::domain::repositories::media_repository::MediaRepository;
use crate::domain::services::crawl_service::{CrawlError, CrawlService, CrawlSummary};
use crate::engines::traits::PlatformClient;
use metrics::histogram;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, info};

/// 爬取工作器
///
/// 未配置间隔时只运行一轮；配置间隔后循环运行，两轮之间休眠，轮次之间从不重叠
pub struct CrawlWorker<R: MediaRepository, P: PlatformClient> {
    /// 爬取服务
    service: CrawlService<R, P>,
    /// 两轮之间的休眠时间
    interval: Option<Duration>,
}

impl<R: MediaRepository, P: PlatformClient> CrawlWorker<R, P> {
    /// 创建新的爬取工作器实例
    ///
    /// # 参数
    ///
    /// * `service` - 爬取服务
    /// * `interval` - 循环间隔，`None` 表示只运行一轮
    pub fn new(service: CrawlService<R, P>, interval: Option<Duration>) -> Self {
        Self { service, interval }
    }

    /// 运行一轮抓取
    pub async fn run_once(&self) -> Result<CrawlSummary, CrawlError> {
        let start = Instant::now();
        let result = self.service.run().await;
        histogram!("crawl_pass_duration_seconds").record(start.elapsed().as_secs_f64());
        result
    }

    /// 运行工作器直到 `shutdown` 完成
    ///
    /// 单轮模式下直接返回该轮的结果；循环模式下登录失败只记录日志，等待下一轮。
    /// 正在进行的一轮总会完整结束后才响应停止信号。
    pub async fn run_until<F>(&self, shutdown: F) -> Result<(), CrawlError>
    where
        F: Future<Output = ()>,
    {
        let Some(interval) = self.interval else {
            return self.run_once().await.map(|_| ());
        };

        info!(interval_secs = interval.as_secs(), "Crawl worker started");
        tokio::pin!(shutdown);

        loop {
            if let Err(e) = self.run_once().await {
                error!("Crawl pass failed: {}", e);
            }

            tokio::select! {
                _ = &mut shutdown => {
                    info!("Crawl worker stopping");
                    return Ok(());
                }
                _ = sleep(interval) => {}
            }
        }
    }
}

#[cfg(test)]
#[path = "crawl_worker_test.rs"]
mod tests;
