//! Create attendance_sessions table

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_workers::Workers;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AttendanceSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AttendanceSessions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AttendanceSessions::WorkerId).string().not_null())
                    .col(
                        ColumnDef::new(AttendanceSessions::EntryAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AttendanceSessions::ExitAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(AttendanceSessions::HoursWorked).double())
                    .col(
                        ColumnDef::new(AttendanceSessions::EntrySignature)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AttendanceSessions::ExitSignature).string())
                    .col(
                        ColumnDef::new(AttendanceSessions::Status)
                            .string_len(20)
                            .not_null()
                            .default("active"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attendance_sessions_worker")
                            .from(AttendanceSessions::Table, AttendanceSessions::WorkerId)
                            .to(Workers::Table, Workers::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_attendance_sessions_worker_entry")
                    .table(AttendanceSessions::Table)
                    .col(AttendanceSessions::WorkerId)
                    .col(AttendanceSessions::EntryAt)
                    .to_owned(),
            )
            .await?;

        // At most one open session per worker
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS uq_attendance_sessions_open_worker \
                 ON attendance_sessions (worker_id) WHERE exit_at IS NULL",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AttendanceSessions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum AttendanceSessions {
    Table,
    Id,
    WorkerId,
    EntryAt,
    ExitAt,
    HoursWorked,
    EntrySignature,
    ExitSignature,
    Status,
}
