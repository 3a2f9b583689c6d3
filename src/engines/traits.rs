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

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 平台客户端错误类型
#[derive(Error, Debug)]
pub enum PlatformError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 平台返回非成功状态码
    #[error("Unexpected status {status} from {endpoint}")]
    UnexpectedStatus { endpoint: String, status: u16 },
    /// 登录失败
    #[error("Authentication failed: {0}")]
    Authentication(String),
    /// 尚未登录
    #[error("Not logged in")]
    NotLoggedIn,
    /// 用户不存在
    #[error("User not found: {0}")]
    UserNotFound(String),
    /// 其他错误
    #[error("Other error: {0}")]
    Other(String),
}

/// 平台上的单个资源（图片或视频）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteResource {
    /// 资源ID
    pub id: String,
    /// 缩略图地址
    pub thumbnail_url: String,
    /// 平台媒体类型编码
    pub media_type: i32,
}

/// 平台上的一条媒体（帖子），可能包含多个资源
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteMedia {
    /// 媒体ID
    pub id: String,
    /// 附带的资源列表，轮播帖子会有多个
    #[serde(default)]
    pub resources: Vec<RemoteResource>,
}

/// 远程平台客户端特质
///
/// 登录、用户名解析和媒体抓取三个能力。爬虫只依赖这个特质，
/// 测试中使用 mock 替代网络访问。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// 使用账号密码登录平台
    async fn login(&self, username: &str, password: &str) -> Result<(), PlatformError>;

    /// 将用户名解析为平台用户ID
    async fn resolve_user_id(&self, username: &str) -> Result<String, PlatformError>;

    /// 获取用户最近的媒体，最多 `limit` 条
    async fn fetch_user_media(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<RemoteMedia>, PlatformError>;

    /// 客户端名称
    fn name(&self) -> &'static str;
}
