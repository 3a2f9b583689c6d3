// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 数据库实体模块
///
/// 使用SeaORM框架映射 media_data 和 processed_users 两张表
pub mod media_data;
pub mod processed_user;
