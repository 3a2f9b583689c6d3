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

use crate::domain::models::media::{MediaRecord, ProcessedUser, ResourceType};
use crate::domain::repositories::media_repository::{MediaRepository, RepositoryError};
use crate::infrastructure::database::entities::{media_data, processed_user};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{sea_query::OnConflict, *};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// 媒体仓库的数据库实现
///
/// 支持 Postgres 和 SQLite，写入使用 `ON CONFLICT DO NOTHING`
pub struct SeaOrmMediaRepository {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl SeaOrmMediaRepository {
    /// 创建新的媒体仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<media_data::Model> for MediaRecord {
    fn from(m: media_data::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            user_name: m.user_name,
            resource_id: m.resource_id,
            resource_url: m.resource_url,
            resource_type: ResourceType::from_code(m.resource_type),
            created_at: m.created_at.into(),
        }
    }
}

impl From<processed_user::Model> for ProcessedUser {
    fn from(m: processed_user::Model) -> Self {
        Self::new(m.user_name)
    }
}

fn to_active_model(record: &MediaRecord) -> media_data::ActiveModel {
    media_data::ActiveModel {
        id: Set(record.id),
        user_id: Set(record.user_id.clone()),
        user_name: Set(record.user_name.clone()),
        resource_id: Set(record.resource_id.clone()),
        resource_url: Set(record.resource_url.clone()),
        resource_type: Set(record.resource_type.code()),
        created_at: Set(record.created_at.into()),
    }
}

#[async_trait]
impl MediaRepository for SeaOrmMediaRepository {
    async fn load(&self) -> Result<Vec<MediaRecord>, RepositoryError> {
        let models = media_data::Entity::find()
            .order_by_asc(media_data::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(MediaRecord::from).collect())
    }

    async fn save(&self, records: &[MediaRecord]) -> Result<u64, RepositoryError> {
        if records.is_empty() {
            return Ok(0);
        }

        let result = media_data::Entity::insert_many(records.iter().map(to_active_model))
            .on_conflict(
                OnConflict::column(media_data::Column::ResourceId)
                    .do_nothing()
                    .to_owned(),
            )
            .do_nothing()
            .exec_without_returning(self.db.as_ref())
            .await?;

        let inserted = match result {
            TryInsertResult::Inserted(n) => n,
            TryInsertResult::Empty | TryInsertResult::Conflicted => 0,
        };
        debug!(requested = records.len(), inserted, "Saved media batch");
        Ok(inserted)
    }

    async fn processed_users(&self) -> Result<HashSet<String>, RepositoryError> {
        let models = processed_user::Entity::find()
            .all(self.db.as_ref())
            .await?;

        Ok(models
            .into_iter()
            .map(|m| ProcessedUser::from(m).user_name)
            .collect())
    }

    async fn existing_resource_ids(&self) -> Result<HashSet<String>, RepositoryError> {
        let ids: Vec<String> = media_data::Entity::find()
            .select_only()
            .column(media_data::Column::ResourceId)
            .into_tuple()
            .all(self.db.as_ref())
            .await?;

        Ok(ids.into_iter().collect())
    }

    async fn add_processed_user(&self, user_name: &str) -> Result<(), RepositoryError> {
        let model = processed_user::ActiveModel {
            user_name: Set(user_name.to_string()),
            created_at: Set(Utc::now().into()),
        };

        processed_user::Entity::insert(model)
            .on_conflict(
                OnConflict::column(processed_user::Column::UserName)
                    .do_nothing()
                    .to_owned(),
            )
            .do_nothing()
            .exec_without_returning(self.db.as_ref())
            .await?;
        Ok(())
    }
}
