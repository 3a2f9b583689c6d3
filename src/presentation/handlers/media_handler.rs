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

use axum::{
    body::Body,
    extract::{Extension, Path},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use metrics::counter;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{
    domain::{
        models::media::MediaStats,
        repositories::media_repository::MediaRepository,
        services::media_cache::{load_stats, CacheError, MediaCache},
    },
    engines::image_proxy::ImageProxy,
    presentation::errors::AppError,
};

/// 随机返回一个资源ID
///
/// 缓存为空且存储中也没有数据时返回 404
pub async fn get_random_media<R>(
    Extension(cache): Extension<Arc<MediaCache<R>>>,
) -> Result<Json<Value>, AppError>
where
    R: MediaRepository + 'static,
{
    let record = cache.pick_random().await.ok_or(CacheError::NoMedia)?;
    counter!("media_random_total").increment(1);

    Ok(Json(json!({ "data": record.resource_id })))
}

/// 按资源ID代理图片
///
/// 命中的记录从缓存中移除，图片字节流原样转发给调用方
pub async fn get_media<R>(
    Extension(cache): Extension<Arc<MediaCache<R>>>,
    Extension(proxy): Extension<Arc<ImageProxy>>,
    Path(resource_id): Path<String>,
) -> Result<Response, AppError>
where
    R: MediaRepository + 'static,
{
    let record = cache
        .get_by_id(&resource_id)
        .await
        .ok_or_else(|| CacheError::NotFound(resource_id.clone()))?;

    let image = match proxy.fetch(&record.resource_url).await {
        Ok(image) => image,
        Err(e) => {
            warn!(resource_id = %resource_id, url = %record.resource_url, "Image fetch failed: {}", e);
            counter!("image_proxy_failures_total").increment(1);
            return Err(e.into());
        }
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&image.content_type)?,
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_str(proxy.cache_control())?,
    );
    if let Some(len) = image.content_length() {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    }

    counter!("media_served_total").increment(1);
    debug!(resource_id = %resource_id, user_name = %record.user_name, "Serving media");

    Ok((headers, Body::from_stream(image.into_stream())).into_response())
}

/// 媒体统计
///
/// 直接读取存储，不经过也不影响缓存
pub async fn get_stats<R>(Extension(repo): Extension<Arc<R>>) -> Json<MediaStats>
where
    R: MediaRepository + 'static,
{
    Json(load_stats(repo.as_ref()).await)
}
