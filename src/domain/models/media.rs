// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// 媒体记录实体
///
/// 爬虫第一次发现某个资源时创建，之后不再修改。
/// `resource_id` 在存储中全局唯一，重复写入会被静默忽略。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRecord {
    /// 记录唯一标识符，由爬虫生成
    pub id: Uuid,
    /// 平台上的用户ID
    pub user_id: String,
    /// 平台上的用户名
    pub user_name: String,
    /// 资源ID，存储内唯一
    pub resource_id: String,
    /// 资源地址
    pub resource_url: String,
    /// 资源类型
    pub resource_type: ResourceType,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

/// 资源类型枚举
///
/// 持久化为整数编码：1 图片，2 视频，0 其他
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// 图片
    #[default]
    Image,
    /// 视频
    Video,
    /// 其他
    Other,
}

impl ResourceType {
    /// 根据平台返回的媒体类型编码解析资源类型
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => ResourceType::Image,
            2 => ResourceType::Video,
            _ => ResourceType::Other,
        }
    }

    /// 存储使用的整数编码
    pub fn code(self) -> i32 {
        match self {
            ResourceType::Image => 1,
            ResourceType::Video => 2,
            ResourceType::Other => 0,
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ResourceType::Image => write!(f, "image"),
            ResourceType::Video => write!(f, "video"),
            ResourceType::Other => write!(f, "other"),
        }
    }
}

/// 已处理用户
///
/// 标记某个用户至少完成过一轮完整抓取，之后的抓取使用较小的数量限制。
/// 序列化为单纯的用户名字符串。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessedUser {
    pub user_name: String,
}

impl ProcessedUser {
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
        }
    }
}

/// 媒体统计信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MediaStats {
    /// 记录总数
    pub total_images: usize,
    /// 不同用户名的数量
    pub unique_users: usize,
    /// 去重后的用户名列表
    pub users: Vec<String>,
}

impl MediaStats {
    /// 根据一份存储快照计算统计信息
    pub fn from_records(records: &[MediaRecord]) -> Self {
        let users: BTreeSet<&str> = records.iter().map(|r| r.user_name.as_str()).collect();

        Self {
            total_images: records.len(),
            unique_users: users.len(),
            users: users.into_iter().map(str::to_string).collect(),
        }
    }
}
