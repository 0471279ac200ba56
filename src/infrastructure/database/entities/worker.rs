//! Worker entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum WorkerRole {
    #[sea_orm(string_value = "worker")]
    Worker,
    #[sea_orm(string_value = "supervisor")]
    Supervisor,
    #[sea_orm(string_value = "admin")]
    Admin,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "workers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub full_name: String,

    #[sea_orm(nullable, unique)]
    pub document_id: Option<String>,

    #[sea_orm(unique)]
    pub email: String,

    pub pin_hash: String,

    /// Only set for operators with console access
    #[sea_orm(nullable)]
    pub password_hash: Option<String>,

    pub role: WorkerRole,
    pub is_active: bool,
    pub on_site: bool,

    #[sea_orm(nullable)]
    pub last_entry_at: Option<DateTimeUtc>,

    #[sea_orm(nullable)]
    pub last_exit_at: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::attendance_session::Entity")]
    AttendanceSessions,
}

impl Related<super::attendance_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AttendanceSessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
