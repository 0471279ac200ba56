//! Create fleet_profiles table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FleetProfiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FleetProfiles::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FleetProfiles::FullName).string().not_null())
                    .col(
                        ColumnDef::new(FleetProfiles::DocumentId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(FleetProfiles::SecretPinHash)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FleetProfiles::FleetName).string().not_null())
                    .col(
                        ColumnDef::new(FleetProfiles::DriverCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(FleetProfiles::RouteCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(FleetProfiles::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(FleetProfiles::LastArrivalAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(FleetProfiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FleetProfiles::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FleetProfiles::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum FleetProfiles {
    Table,
    Id,
    FullName,
    DocumentId,
    SecretPinHash,
    FleetName,
    DriverCount,
    RouteCount,
    IsActive,
    LastArrivalAt,
    CreatedAt,
    UpdatedAt,
}
