// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 默认日志过滤规则，可通过 RUST_LOG 覆盖
pub const DEFAULT_FILTER: &str = "info,mediacrawl=debug";

/// 初始化日志
///
/// # 参数
///
/// * `json` - 是否输出 JSON 格式日志
pub fn init_telemetry(json: bool) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .init();
}
