//! Attendance session entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "attendance_sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub worker_id: String,

    pub entry_at: DateTimeUtc,

    /// NULL while the worker is on site
    #[sea_orm(nullable)]
    pub exit_at: Option<DateTimeUtc>,

    #[sea_orm(nullable)]
    pub hours_worked: Option<f64>,

    pub entry_signature: String,

    #[sea_orm(nullable)]
    pub exit_signature: Option<String>,

    /// active | finished
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::worker::Entity",
        from = "Column::WorkerId",
        to = "super::worker::Column::Id"
    )]
    Worker,
}

impl Related<super::worker::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Worker.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
