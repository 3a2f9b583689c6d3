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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;
use validator::Validate;

/// 应用程序配置设置
///
/// 包含服务器、数据库、存储、远程平台、爬虫、图片代理、缓存、日志和指标等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 数据库配置
    pub database: DatabaseSettings,
    /// 存储配置
    pub storage: StorageSettings,
    /// 远程平台配置
    pub platform: PlatformSettings,
    /// 爬虫配置
    pub crawler: CrawlerSettings,
    /// 图片代理配置
    pub image_proxy: ImageProxySettings,
    /// 媒体缓存配置
    #[serde(default)]
    pub cache: CacheSettings,
    /// 日志配置
    pub logging: LoggingSettings,
    /// 指标配置
    pub metrics: MetricsSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 数据库配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
}

/// 存储后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// 关系型数据库 (Postgres / SQLite)
    Database,
    /// 本地 JSON 文件
    Json,
}

/// 存储配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// 存储后端 (database, json)
    pub backend: StorageBackend,
    /// JSON 文件目录 (当 backend=json 时使用)
    pub json_dir: String,
}

/// 远程平台配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformSettings {
    /// 平台 API 根地址
    pub base_url: String,
    /// 登录用户名
    pub username: String,
    /// 登录密码
    pub password: String,
    /// 单次请求超时时间（秒）
    pub request_timeout_secs: u64,
}

/// 爬虫配置设置
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CrawlerSettings {
    /// 目标用户名列表，按配置顺序抓取
    #[serde(default)]
    pub target_usernames: Vec<String>,
    /// 新用户的抓取数量
    #[validate(range(min = 1))]
    pub new_user_limit: u32,
    /// 已处理用户的抓取数量
    #[validate(range(min = 1))]
    pub existing_user_limit: u32,
    /// 循环抓取间隔（秒），未设置时只运行一轮
    pub interval_secs: Option<u64>,
}

/// 图片代理配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ImageProxySettings {
    /// 上游请求超时时间（秒）
    pub timeout_secs: u64,
    /// Cache-Control 的 max-age（秒）
    pub max_age_secs: u64,
    /// 上游未返回 Content-Type 时使用的默认值
    pub default_content_type: String,
}

/// 媒体缓存配置设置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    /// 缓存快照的最长存活时间（秒），未设置时只在缓存为空时重新加载
    pub max_age_secs: Option<u64>,
}

/// 日志配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// 是否输出 JSON 格式日志
    pub json: bool,
}

/// 指标配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用 Prometheus 导出
    pub enabled: bool,
    /// 导出监听地址
    pub listen_addr: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从配置文件和环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Self::with_defaults(Config::builder())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("MEDIACRAWL")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("crawler.target_usernames")
                    .try_parsing(true),
            );

        Self::from_builder(builder)
    }

    /// 从已组装好的配置源构建并校验配置
    pub fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.ensure_valid()?;
        Ok(settings)
    }

    /// 注册所有默认值
    pub fn with_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            // Server
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            // Database
            .set_default("database.url", "sqlite://data/mediacrawl.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            // Storage
            .set_default("storage.backend", "database")?
            .set_default("storage.json_dir", "data")?
            // Platform
            .set_default("platform.base_url", "http://127.0.0.1:8080")?
            .set_default("platform.username", "")?
            .set_default("platform.password", "")?
            .set_default("platform.request_timeout_secs", 30)?
            // Crawler
            .set_default("crawler.target_usernames", Vec::<String>::new())?
            .set_default("crawler.new_user_limit", 20)?
            .set_default("crawler.existing_user_limit", 5)?
            // Image proxy
            .set_default("image_proxy.timeout_secs", 30)?
            .set_default("image_proxy.max_age_secs", 3600)?
            .set_default("image_proxy.default_content_type", "image/jpeg")?
            // Logging / metrics
            .set_default("logging.json", false)?
            .set_default("metrics.enabled", false)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")
    }

    /// 对爬虫与平台配置进行校验
    fn ensure_valid(&self) -> Result<(), ConfigError> {
        self.crawler
            .validate()
            .map_err(|e| ConfigError::Message(format!("invalid crawler settings: {}", e)))?;
        url::Url::parse(&self.platform.base_url)
            .map_err(|e| ConfigError::Message(format!("invalid platform.base_url: {}", e)))?;
        Ok(())
    }
}

impl CrawlerSettings {
    /// 去除空白后的目标用户名，保持配置顺序
    pub fn usernames(&self) -> Vec<String> {
        self.target_usernames
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// 循环抓取间隔
    pub fn interval(&self) -> Option<Duration> {
        self.interval_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
