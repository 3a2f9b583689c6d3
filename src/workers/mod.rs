// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 爬取工作器（crawl_worker）负责单轮或按间隔循环执行抓取
pub mod crawl_worker;
