use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ChatHistory::Table)
                    .if_not_exists()
                    .col(pk_auto(ChatHistory::Id))
                    .col(text(ChatHistory::Question))
                    .col(text(ChatHistory::Sql))
                    .col(timestamp_with_time_zone(ChatHistory::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_chat_history_created_at")
                    .table(ChatHistory::Table)
                    .col(ChatHistory::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ChatHistory::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ChatHistory {
    Table,
    Id,
    Question,
    Sql,
    CreatedAt,
}
