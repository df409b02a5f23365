use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(IdentityRelations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IdentityRelations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(IdentityRelations::ProviderSlug)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IdentityRelations::ProviderUserId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IdentityRelations::ProviderService)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(IdentityRelations::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(IdentityRelations::LinkedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IdentityRelations::UsedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(IdentityRelations::Table, IdentityRelations::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Concurrent federations for the same external identity must collide
        // here; the losing insert surfaces as a unique violation.
        manager
            .create_index(
                Index::create()
                    .table(IdentityRelations::Table)
                    .col(IdentityRelations::ProviderSlug)
                    .col(IdentityRelations::ProviderUserId)
                    .unique()
                    .name("uq_identity_relations_provider_subject")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(IdentityRelations::Table)
                    .col(IdentityRelations::UserId)
                    .name("idx_identity_relations_user_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IdentityRelations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum IdentityRelations {
    Table,
    Id,
    ProviderSlug,
    ProviderUserId,
    ProviderService,
    UserId,
    LinkedAt,
    UsedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
