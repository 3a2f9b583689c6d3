// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::StorageSettings;
use crate::domain::models::media::{MediaRecord, ProcessedUser};
use crate::domain::repositories::media_repository::{MediaRepository, RepositoryError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

const MEDIA_FILE: &str = "media_data.json";
const PROCESSED_USERS_FILE: &str = "processed_users.json";

/// 媒体仓库的 JSON 文件实现
///
/// 在目录下维护 `media_data.json`（记录数组）和 `processed_users.json`（用户名数组）。
/// 文件在第一次写入时创建，写入先落到临时文件再重命名，读取方不会看到写了一半的文件。
pub struct JsonFileMediaRepository {
    dir: PathBuf,
    /// 串行化读改写
    write_lock: Mutex<()>,
}

impl JsonFileMediaRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn from_settings(settings: &StorageSettings) -> Self {
        Self::new(&settings.json_dir)
    }

    /// 读取 JSON 文件，文件不存在或为空时返回默认值
    async fn read_json<T: DeserializeOwned + Default>(
        &self,
        name: &str,
    ) -> Result<T, RepositoryError> {
        let bytes = match fs::read(self.dir.join(name)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => return Err(e.into()),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(T::default());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<(), RepositoryError> {
        fs::create_dir_all(&self.dir).await?;

        let target = self.dir.join(name);
        let tmp = self.dir.join(format!("{}.tmp", name));
        fs::write(&tmp, serde_json::to_vec_pretty(value)?).await?;
        fs::rename(&tmp, &target).await?;

        debug!(path = %target.display(), "Wrote JSON store file");
        Ok(())
    }
}

#[async_trait]
impl MediaRepository for JsonFileMediaRepository {
    async fn load(&self) -> Result<Vec<MediaRecord>, RepositoryError> {
        self.read_json(MEDIA_FILE).await
    }

    async fn save(&self, records: &[MediaRecord]) -> Result<u64, RepositoryError> {
        let _guard = self.write_lock.lock().await;

        let mut stored: Vec<MediaRecord> = self.read_json(MEDIA_FILE).await?;
        let mut known: HashSet<String> = stored.iter().map(|r| r.resource_id.clone()).collect();

        let mut inserted = 0u64;
        for record in records {
            if known.insert(record.resource_id.clone()) {
                stored.push(record.clone());
                inserted += 1;
            }
        }

        if inserted > 0 {
            self.write_json(MEDIA_FILE, &stored).await?;
        }
        Ok(inserted)
    }

    async fn processed_users(&self) -> Result<HashSet<String>, RepositoryError> {
        let users: Vec<ProcessedUser> = self.read_json(PROCESSED_USERS_FILE).await?;
        Ok(users.into_iter().map(|u| u.user_name).collect())
    }

    async fn existing_resource_ids(&self) -> Result<HashSet<String>, RepositoryError> {
        let records = self.load().await?;
        Ok(records.into_iter().map(|r| r.resource_id).collect())
    }

    async fn add_processed_user(&self, user_name: &str) -> Result<(), RepositoryError> {
        let _guard = self.write_lock.lock().await;

        let mut users: Vec<ProcessedUser> = self.read_json(PROCESSED_USERS_FILE).await?;
        if users.iter().any(|u| u.user_name == user_name) {
            return Ok(());
        }
        users.push(ProcessedUser::new(user_name));
        self.write_json(PROCESSED_USERS_FILE, &users).await
    }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
