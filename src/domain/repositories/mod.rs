// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 媒体仓库（media_repository）定义媒体记录和已处理用户的持久化契约，
/// 具体实现由基础设施层提供。
pub mod media_repository;
