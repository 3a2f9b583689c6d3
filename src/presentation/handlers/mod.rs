// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// HTTP请求处理器模块
///
/// 媒体处理器负责随机媒体、按ID代理图片和统计三个端点
pub mod media_handler;
