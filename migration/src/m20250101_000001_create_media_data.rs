use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MediaData::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MediaData::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MediaData::UserId).string().not_null())
                    .col(ColumnDef::new(MediaData::UserName).string().not_null())
                    .col(ColumnDef::new(MediaData::ResourceId).string().not_null())
                    .col(ColumnDef::new(MediaData::ResourceUrl).text().not_null())
                    .col(
                        ColumnDef::new(MediaData::ResourceType)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(MediaData::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // resource_id is the dedup key for insert-or-ignore
        manager
            .create_index(
                Index::create()
                    .name("idx_media_data_resource_id")
                    .table(MediaData::Table)
                    .col(MediaData::ResourceId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_media_data_user_name")
                    .table(MediaData::Table)
                    .col(MediaData::UserName)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MediaData::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum MediaData {
    Table,
    Id,
    UserId,
    UserName,
    ResourceId,
    ResourceUrl,
    ResourceType,
    CreatedAt,
}
