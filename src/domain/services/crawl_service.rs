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

use crate::config::settings::{CrawlerSettings, PlatformSettings};
use crate::domain::models::media::{MediaRecord, ResourceType};
use crate::domain::repositories::media_repository::{MediaRepository, RepositoryError};
use crate::engines::traits::{PlatformClient, PlatformError, RemoteMedia};
use chrono::Utc;
use metrics::counter;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

/// 爬取错误类型
#[derive(Error, Debug)]
pub enum CrawlError {
    /// 登录失败，整轮抓取中止
    #[error("Authentication failed: {0}")]
    Authentication(#[source] PlatformError),
}

/// 单个用户抓取失败的原因
#[derive(Error, Debug)]
enum UserCrawlError {
    #[error(transparent)]
    Platform(#[from] PlatformError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// 爬取配置
///
/// 登录凭据、目标用户以及新老用户的抓取数量
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// 登录用户名
    pub username: String,
    /// 登录密码
    pub password: String,
    /// 目标用户名，按顺序抓取
    pub target_usernames: Vec<String>,
    /// 新用户抓取数量
    pub new_user_limit: u32,
    /// 已处理用户抓取数量
    pub existing_user_limit: u32,
}

impl CrawlConfig {
    /// 根据平台和爬虫配置组装
    pub fn from_settings(platform: &PlatformSettings, crawler: &CrawlerSettings) -> Self {
        Self {
            username: platform.username.clone(),
            password: platform.password.clone(),
            target_usernames: crawler.usernames(),
            new_user_limit: crawler.new_user_limit,
            existing_user_limit: crawler.existing_user_limit,
        }
    }

    /// 根据用户是否已处理选择抓取数量
    pub fn limit_for(&self, already_processed: bool) -> u32 {
        if already_processed {
            self.existing_user_limit
        } else {
            self.new_user_limit
        }
    }
}

/// 一轮抓取的结果汇总
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// 成功处理的用户数
    pub users_processed: usize,
    /// 失败的用户数
    pub users_failed: usize,
    /// 新写入的记录数
    pub new_records: u64,
}

/// 爬取服务
///
/// 顺序遍历目标用户，过滤已见过的资源并批量写入新记录
pub struct CrawlService<R: MediaRepository, P: PlatformClient> {
    /// 媒体仓库
    repo: Arc<R>,
    /// 平台客户端
    client: Arc<P>,
    /// 爬取配置
    config: CrawlConfig,
}

impl<R: MediaRepository, P: PlatformClient> CrawlService<R, P> {
    /// 创建新的爬取服务实例
    ///
    /// # 参数
    ///
    /// * `repo` - 媒体仓库
    /// * `client` - 平台客户端
    /// * `config` - 爬取配置
    pub fn new(repo: Arc<R>, client: Arc<P>, config: CrawlConfig) -> Self {
        Self {
            repo,
            client,
            config,
        }
    }

    /// 执行一轮完整抓取
    ///
    /// 登录失败时整轮中止且不写入任何数据；单个用户失败只记录日志并跳过。
    ///
    /// # 返回值
    ///
    /// * `Ok(CrawlSummary)` - 本轮抓取汇总
    /// * `Err(CrawlError)` - 登录失败
    pub async fn run(&self) -> Result<CrawlSummary, CrawlError> {
        if let Err(e) = self
            .client
            .login(&self.config.username, &self.config.password)
            .await
        {
            error!(client = self.client.name(), "Login failed: {}", e);
            return Err(CrawlError::Authentication(e));
        }
        info!(client = self.client.name(), "Login successful");

        let mut processed_users = self.repo.processed_users().await.unwrap_or_else(|e| {
            error!("Failed to load processed users: {}", e);
            HashSet::new()
        });
        let mut existing_ids = self.repo.existing_resource_ids().await.unwrap_or_else(|e| {
            error!("Failed to load existing resource ids: {}", e);
            HashSet::new()
        });

        let mut summary = CrawlSummary::default();

        for username in &self.config.target_usernames {
            let already_processed = processed_users.contains(username);
            match self
                .crawl_user(username, already_processed, &mut existing_ids)
                .await
            {
                Ok(inserted) => {
                    summary.users_processed += 1;
                    summary.new_records += inserted;
                    if !already_processed {
                        processed_users.insert(username.clone());
                    }
                }
                Err(e) => {
                    error!(username = %username, "Error processing user: {}", e);
                    counter!("crawl_user_failures_total").increment(1);
                    summary.users_failed += 1;
                }
            }
        }

        info!(
            users_processed = summary.users_processed,
            users_failed = summary.users_failed,
            new_records = summary.new_records,
            "Crawl pass finished"
        );
        Ok(summary)
    }

    /// 抓取单个用户
    ///
    /// 成功写入后把新资源ID并入 `existing_ids`，返回实际插入的记录数
    async fn crawl_user(
        &self,
        username: &str,
        already_processed: bool,
        existing_ids: &mut HashSet<String>,
    ) -> Result<u64, UserCrawlError> {
        let limit = self.config.limit_for(already_processed);
        let user_id = self.client.resolve_user_id(username).await?;
        let medias = self.client.fetch_user_media(&user_id, limit).await?;

        let records = new_records(username, &user_id, &medias, existing_ids);
        let inserted = if records.is_empty() {
            0
        } else {
            let inserted = self.repo.save(&records).await?;
            if inserted < records.len() as u64 {
                warn!(
                    username = %username,
                    skipped = records.len() as u64 - inserted,
                    "Storage ignored duplicate resources"
                );
            }
            existing_ids.extend(records.into_iter().map(|r| r.resource_id));
            inserted
        };

        if inserted > 0 {
            info!(username = %username, limit, "Added {} new media", inserted);
            counter!("crawl_new_records_total").increment(inserted);
        }

        // Marked even when the fetch returned no media; only a failed fetch or save leaves the user unmarked
        if !already_processed {
            self.repo.add_processed_user(username).await?;
        }

        Ok(inserted)
    }
}

/// 过滤出尚未见过的资源并生成记录
///
/// 同时丢弃已在 `existing_ids` 中的资源以及本批次内的重复资源
pub fn new_records(
    username: &str,
    user_id: &str,
    medias: &[RemoteMedia],
    existing_ids: &HashSet<String>,
) -> Vec<MediaRecord> {
    let mut batch_ids: HashSet<&str> = HashSet::new();

    medias
        .iter()
        .flat_map(|media| media.resources.iter())
        .filter(|resource| {
            !existing_ids.contains(&resource.id) && batch_ids.insert(resource.id.as_str())
        })
        .map(|resource| MediaRecord {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            user_name: username.to_string(),
            resource_id: resource.id.clone(),
            resource_url: resource.thumbnail_url.clone(),
            resource_type: ResourceType::from_code(resource.media_type),
            created_at: Utc::now(),
        })
        .collect()
}

#[cfg(test)]
#[path = "crawl_service_test.rs"]
mod tests;
