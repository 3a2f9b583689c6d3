// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::media::MediaRecord;
use async_trait::async_trait;
use sea_orm::DbErr;
use std::collections::HashSet;
use thiserror::Error;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 文件读写错误
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// 序列化错误
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 媒体仓库特质
///
/// 媒体记录与已处理用户的持久化边界。爬虫只写入，API 服务只读取。
/// 所有写入都是 insert-or-ignore 语义：重复的 `resource_id` 或用户名不会报错。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaRepository: Send + Sync {
    /// 加载全部媒体记录
    async fn load(&self) -> Result<Vec<MediaRecord>, RepositoryError>;

    /// 批量写入媒体记录
    ///
    /// # 参数
    ///
    /// * `records` - 待写入的记录
    ///
    /// # 返回值
    ///
    /// * `Ok(u64)` - 实际插入的记录数（已存在的 `resource_id` 不计入）
    /// * `Err(RepositoryError)` - 写入失败
    async fn save(&self, records: &[MediaRecord]) -> Result<u64, RepositoryError>;

    /// 获取已处理用户名集合
    async fn processed_users(&self) -> Result<HashSet<String>, RepositoryError>;

    /// 获取已存在的资源ID集合
    async fn existing_resource_ids(&self) -> Result<HashSet<String>, RepositoryError>;

    /// 标记用户已处理
    async fn add_processed_user(&self, user_name: &str) -> Result<(), RepositoryError>;
}
