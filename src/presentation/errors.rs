// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::domain::services::media_cache::CacheError;
use crate::engines::image_proxy::ProxyError;

/// 应用错误类型
///
/// 封装所有可能的应用层错误，提供统一的错误处理接口
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = if let Some(e) = self.0.downcast_ref::<CacheError>() {
            (StatusCode::NOT_FOUND, e.to_string())
        } else if let Some(e) = self.0.downcast_ref::<ProxyError>() {
            // Upstream details stay in the logs
            error!("Image proxy failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch image".to_string(),
            )
        } else {
            error!("Unhandled error: {:#}", self.0);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
