use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One JSON document per achievement; the ledger holds the lifecycle state.
        manager
            .create_table(
                Table::create()
                    .table(AchievementDocuments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AchievementDocuments::Id)
                            .string_len(24)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AchievementDocuments::StudentId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AchievementDocuments::AchievementType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AchievementDocuments::Document)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AchievementDocuments::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AchievementDocuments::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_achievement_documents_student_id")
                    .table(AchievementDocuments::Table)
                    .col(AchievementDocuments::StudentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_achievement_documents_type")
                    .table(AchievementDocuments::Table)
                    .col(AchievementDocuments::AchievementType)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AchievementDocuments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AchievementDocuments {
    Table,
    Id,
    StudentId,
    AchievementType,
    Document,
    CreatedAt,
    UpdatedAt,
}
