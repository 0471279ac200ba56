//! Create fleet_access_records table

use sea_orm_migration::prelude::*;

use super::m20240101_000002_create_fleet_profiles::FleetProfiles;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FleetAccessRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FleetAccessRecords::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FleetAccessRecords::FleetProfileId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FleetAccessRecords::ArrivalAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FleetAccessRecords::DepartureAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(FleetAccessRecords::HoursOnSite).double())
                    .col(ColumnDef::new(FleetAccessRecords::CargoQuantity).integer())
                    .col(ColumnDef::new(FleetAccessRecords::Observation).text())
                    .col(
                        ColumnDef::new(FleetAccessRecords::EntrySignature)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FleetAccessRecords::ExitSignature).string())
                    .col(
                        ColumnDef::new(FleetAccessRecords::Status)
                            .string_len(20)
                            .not_null()
                            .default("on_site"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_fleet_access_records_profile")
                            .from(FleetAccessRecords::Table, FleetAccessRecords::FleetProfileId)
                            .to(FleetProfiles::Table, FleetProfiles::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_fleet_access_records_profile_arrival")
                    .table(FleetAccessRecords::Table)
                    .col(FleetAccessRecords::FleetProfileId)
                    .col(FleetAccessRecords::ArrivalAt)
                    .to_owned(),
            )
            .await?;

        // At most one open record per fleet profile
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS uq_fleet_access_records_open_profile \
                 ON fleet_access_records (fleet_profile_id) WHERE departure_at IS NULL",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FleetAccessRecords::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum FleetAccessRecords {
    Table,
    Id,
    FleetProfileId,
    ArrivalAt,
    DepartureAt,
    HoursOnSite,
    CargoQuantity,
    Observation,
    EntrySignature,
    ExitSignature,
    Status,
}
