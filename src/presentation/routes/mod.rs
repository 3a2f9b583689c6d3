// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::media_repository::MediaRepository;
use crate::domain::services::media_cache::MediaCache;
use crate::engines::image_proxy::ImageProxy;
use crate::presentation::handlers::media_handler;
use axum::{routing::get, Extension, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// 创建应用路由
///
/// `/media/stats` 是静态路径，优先于 `/media/{id}` 匹配
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes<R>() -> Router
where
    R: MediaRepository + 'static,
{
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/version", get(version));

    let media_routes = Router::new()
        .route("/media/random", get(media_handler::get_random_media::<R>))
        .route("/media/stats", get(media_handler::get_stats::<R>))
        .route("/media/{id}", get(media_handler::get_media::<R>));

    Router::new().merge(public_routes).merge(media_routes)
}

/// 组装完整应用
///
/// 注入共享组件，并加上跨域和请求追踪层
///
/// # 参数
///
/// * `repo` - 媒体仓库
/// * `cache` - 媒体缓存
/// * `proxy` - 图片代理
pub fn create_app<R>(repo: Arc<R>, cache: Arc<MediaCache<R>>, proxy: Arc<ImageProxy>) -> Router
where
    R: MediaRepository + 'static,
{
    routes::<R>()
        .layer(Extension(repo))
        .layer(Extension(cache))
        .layer(Extension(proxy))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
