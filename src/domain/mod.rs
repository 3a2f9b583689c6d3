// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：媒体记录、资源类型和统计信息
/// - 仓库接口（repositories）：媒体存储的抽象接口
/// - 服务（services）：去重抓取循环和随机媒体缓存
///
/// 领域层不依赖于任何具体的存储或平台实现。
pub mod models;
pub mod repositories;
pub mod services;
