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

use crate::domain::models::media::{MediaRecord, MediaStats};
use crate::domain::repositories::media_repository::MediaRepository;
use rand::seq::IndexedRandom;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, error, info};

/// 缓存错误类型
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CacheError {
    /// 存储中没有任何媒体
    #[error("No media available")]
    NoMedia,
    /// 指定资源不在缓存中
    #[error("Media not found: {0}")]
    NotFound(String),
}

struct CacheState {
    items: Vec<MediaRecord>,
    loaded_at: Option<Instant>,
}

/// 媒体缓存
///
/// 内存中的媒体记录快照。为空或超过最长存活时间时从仓库重新加载，
/// 所有读写都在同一把锁内完成，并发请求不会看到加载了一半的缓存。
///
/// `get_by_id` 会把命中的记录从缓存中移除，仓库中的数据不受影响。
pub struct MediaCache<R: MediaRepository> {
    repo: Arc<R>,
    state: Mutex<CacheState>,
    max_age: Option<Duration>,
}

impl<R: MediaRepository> MediaCache<R> {
    /// 创建新的媒体缓存
    ///
    /// # 参数
    ///
    /// * `repo` - 媒体仓库
    /// * `max_age` - 快照最长存活时间，`None` 表示只在缓存为空时重新加载
    pub fn new(repo: Arc<R>, max_age: Option<Duration>) -> Self {
        Self {
            repo,
            state: Mutex::new(CacheState {
                items: Vec::new(),
                loaded_at: None,
            }),
            max_age,
        }
    }

    /// 随机选取一条记录，不从缓存中移除
    pub async fn pick_random(&self) -> Option<MediaRecord> {
        let mut state = self.state.lock().await;
        self.refill_if_needed(&mut state).await;

        state.items.choose(&mut rand::rng()).cloned()
    }

    /// 按资源ID取出一条记录并从缓存中移除
    pub async fn get_by_id(&self, resource_id: &str) -> Option<MediaRecord> {
        let mut state = self.state.lock().await;
        self.refill_if_needed(&mut state).await;

        let index = state
            .items
            .iter()
            .position(|r| r.resource_id == resource_id)?;
        let record = state.items.swap_remove(index);
        debug!(
            resource_id = %resource_id,
            remaining = state.items.len(),
            "Evicted media from cache"
        );
        Some(record)
    }

    /// 当前缓存中的记录数
    pub async fn len(&self) -> usize {
        self.state.lock().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn refill_if_needed(&self, state: &mut CacheState) {
        let expired = match (self.max_age, state.loaded_at) {
            (Some(max_age), Some(loaded_at)) => loaded_at.elapsed() >= max_age,
            _ => false,
        };
        if !state.items.is_empty() && !expired {
            return;
        }

        state.items = load_snapshot(self.repo.as_ref()).await;
        state.loaded_at = Some(Instant::now());
        info!(count = state.items.len(), expired, "Media cache refilled");
    }
}

/// 从仓库加载完整快照
///
/// 读取失败时记录错误并返回空列表
pub async fn load_snapshot<R: MediaRepository + ?Sized>(repo: &R) -> Vec<MediaRecord> {
    repo.load().await.unwrap_or_else(|e| {
        error!("Failed to load media records: {}", e);
        Vec::new()
    })
}

/// 直接从仓库计算统计信息，不经过缓存
pub async fn load_stats<R: MediaRepository + ?Sized>(repo: &R) -> MediaStats {
    MediaStats::from_records(&load_snapshot(repo).await)
}

#[cfg(test)]
#[path = "media_cache_test.rs"]
mod tests;
