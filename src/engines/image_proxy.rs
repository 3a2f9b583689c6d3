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

use crate::config::settings::ImageProxySettings;
use bytes::Bytes;
use futures::Stream;
use reqwest::{header, redirect, Client};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// 最多跟随的重定向次数
const MAX_REDIRECTS: usize = 10;

/// 图片代理错误类型
#[derive(Error, Debug)]
pub enum ProxyError {
    /// 请求失败（连接、超时、重定向过多等）
    #[error("Upstream request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 上游返回非成功状态码
    #[error("Upstream returned status {0}")]
    UpstreamStatus(u16),
}

/// 上游返回的图片
///
/// 响应体不在内存中缓冲，由调用方以字节流方式原样转发
pub struct ProxiedImage {
    /// 内容类型
    pub content_type: String,
    response: reqwest::Response,
}

impl ProxiedImage {
    /// 上游声明的内容长度
    pub fn content_length(&self) -> Option<u64> {
        self.response.content_length()
    }

    /// 转换为字节流
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes, reqwest::Error>> + Send {
        self.response.bytes_stream()
    }
}

/// 图片代理
///
/// 按地址抓取远程图片，跟随重定向并限制超时时间
pub struct ImageProxy {
    /// HTTP客户端
    client: Client,
    /// 上游未返回 Content-Type 时使用的默认值
    default_content_type: String,
    /// Cache-Control 头的值
    cache_control: String,
}

impl ImageProxy {
    /// 创建新的图片代理
    ///
    /// # 参数
    ///
    /// * `timeout` - 上游请求超时时间
    /// * `max_age_secs` - 响应缓存时间（秒）
    /// * `default_content_type` - 默认内容类型
    pub fn new(
        timeout: Duration,
        max_age_secs: u64,
        default_content_type: impl Into<String>,
    ) -> Result<Self, ProxyError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self {
            client,
            default_content_type: default_content_type.into(),
            cache_control: format!("public, max-age={}", max_age_secs),
        })
    }

    /// 根据配置创建图片代理
    pub fn from_settings(settings: &ImageProxySettings) -> Result<Self, ProxyError> {
        Self::new(
            Duration::from_secs(settings.timeout_secs),
            settings.max_age_secs,
            settings.default_content_type.clone(),
        )
    }

    /// 响应中附带的 Cache-Control 值
    pub fn cache_control(&self) -> &str {
        &self.cache_control
    }

    /// 抓取远程图片
    ///
    /// # 参数
    ///
    /// * `url` - 图片地址
    ///
    /// # 返回值
    ///
    /// * `Ok(ProxiedImage)` - 上游返回 2xx
    /// * `Err(ProxyError)` - 传输错误或非 2xx 状态码
    pub async fn fetch(&self, url: &str) -> Result<ProxiedImage, ProxyError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::UpstreamStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(self.default_content_type.as_str())
            .to_string();

        debug!(url = %url, content_type = %content_type, "Proxying upstream image");

        Ok(ProxiedImage {
            content_type,
            response,
        })
    }
}

#[cfg(test)]
#[path = "image_proxy_test.rs"]
mod tests;
