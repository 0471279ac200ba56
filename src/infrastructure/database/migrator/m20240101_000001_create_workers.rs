//! Create workers table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Workers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Workers::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Workers::FullName).string().not_null())
                    .col(ColumnDef::new(Workers::DocumentId).string().unique_key())
                    .col(
                        ColumnDef::new(Workers::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Workers::PinHash).string().not_null())
                    .col(ColumnDef::new(Workers::PasswordHash).string())
                    .col(
                        ColumnDef::new(Workers::Role)
                            .string_len(20)
                            .not_null()
                            .default("worker"),
                    )
                    .col(
                        ColumnDef::new(Workers::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Workers::OnSite)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Workers::LastEntryAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Workers::LastExitAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Workers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Workers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Workers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Workers {
    Table,
    Id,
    FullName,
    DocumentId,
    Email,
    PinHash,
    PasswordHash,
    Role,
    IsActive,
    OnSite,
    LastEntryAt,
    LastExitAt,
    CreatedAt,
    UpdatedAt,
}
