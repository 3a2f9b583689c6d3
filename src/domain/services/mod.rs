// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 爬取服务（crawl_service）：按用户顺序抓取并过滤已见过的资源
/// - 媒体缓存（media_cache）：随机选取和按ID取出媒体记录
pub mod crawl_service;
pub mod media_cache;
