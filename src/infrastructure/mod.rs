// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 包含的子模块：
/// - 数据库（database）：数据库连接和实体映射
/// - 指标（metrics）：Prometheus 指标导出
/// - 仓库实现（repositories）：媒体仓库的数据库实现
/// - 存储（storage）：媒体仓库的 JSON 文件实现
pub mod database;
pub mod metrics;
pub mod repositories;
pub mod storage;
