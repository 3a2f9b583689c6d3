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

use crate::config::settings::PlatformSettings;
use crate::engines::traits::{PlatformClient, PlatformError, RemoteMedia};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};
use url::Url;

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Deserialize)]
struct UserResponse {
    id: String,
}

/// 基于 HTTP/JSON 的平台客户端
///
/// 通过 reqwest 访问平台 API：
/// - `POST {base}/api/v1/login` 换取会话令牌
/// - `GET {base}/api/v1/users/{username}` 解析用户ID
/// - `GET {base}/api/v1/users/{id}/media?limit=N` 获取媒体列表
pub struct HttpPlatformClient {
    /// HTTP客户端
    client: Client,
    /// API 根地址
    base_url: Url,
    /// 登录后获得的会话令牌
    token: RwLock<Option<String>>,
}

impl HttpPlatformClient {
    /// 创建新的平台客户端
    ///
    /// # 参数
    ///
    /// * `base_url` - 平台 API 根地址
    /// * `timeout` - 单次请求超时时间
    ///
    /// # 返回值
    ///
    /// * `Ok(HttpPlatformClient)` - 客户端实例
    /// * `Err(PlatformError)` - 地址无效或客户端构建失败
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, PlatformError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| PlatformError::Other(format!("Invalid base url: {}", e)))?;

        let client = Client::builder()
            .user_agent("mediacrawl/0.1.0")
            .timeout(timeout)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: RwLock::new(None),
        })
    }

    /// 根据配置创建平台客户端
    pub fn from_settings(settings: &PlatformSettings) -> Result<Self, PlatformError> {
        Self::new(
            &settings.base_url,
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, PlatformError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PlatformError::Other("Base url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["api", "v1"])
            .extend(segments);
        Ok(url)
    }

    async fn bearer(&self) -> Result<String, PlatformError> {
        self.token
            .read()
            .await
            .clone()
            .ok_or(PlatformError::NotLoggedIn)
    }
}

#[async_trait]
impl PlatformClient for HttpPlatformClient {
    async fn login(&self, username: &str, password: &str) -> Result<(), PlatformError> {
        let url = self.endpoint(&["login"])?;
        let response = self
            .client
            .post(url)
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let body: LoginResponse = response.json().await?;
                *self.token.write().await = Some(body.token);
                info!(username = %username, "Logged in to platform");
                Ok(())
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(
                PlatformError::Authentication(format!("credentials rejected for {}", username)),
            ),
            status => Err(PlatformError::UnexpectedStatus {
                endpoint: "login".to_string(),
                status: status.as_u16(),
            }),
        }
    }

    async fn resolve_user_id(&self, username: &str) -> Result<String, PlatformError> {
        let token = self.bearer().await?;
        let url = self.endpoint(&["users", username])?;
        let response = self.client.get(url).bearer_auth(token).send().await?;

        match response.status() {
            status if status.is_success() => {
                let body: UserResponse = response.json().await?;
                debug!(username = %username, user_id = %body.id, "Resolved user id");
                Ok(body.id)
            }
            StatusCode::NOT_FOUND => Err(PlatformError::UserNotFound(username.to_string())),
            status => Err(PlatformError::UnexpectedStatus {
                endpoint: "users".to_string(),
                status: status.as_u16(),
            }),
        }
    }

    async fn fetch_user_media(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<RemoteMedia>, PlatformError> {
        let token = self.bearer().await?;
        let mut url = self.endpoint(&["users", user_id, "media"])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());

        let response = self.client.get(url).bearer_auth(token).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PlatformError::UnexpectedStatus {
                endpoint: "media".to_string(),
                status: status.as_u16(),
            });
        }

        let mut medias: Vec<RemoteMedia> = response.json().await?;
        // The platform may ignore the limit parameter
        medias.truncate(limit as usize);
        debug!(user_id = %user_id, count = medias.len(), "Fetched user media");
        Ok(medias)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
#[path = "http_platform_test.rs"]
mod tests;
