//! Fleet profile entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "fleet_profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub full_name: String,

    #[sea_orm(unique)]
    pub document_id: String,

    pub secret_pin_hash: String,
    pub fleet_name: String,
    pub driver_count: i32,
    pub route_count: i32,
    pub is_active: bool,

    #[sea_orm(nullable)]
    pub last_arrival_at: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::fleet_access_record::Entity")]
    FleetAccessRecords,
}

impl Related<super::fleet_access_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FleetAccessRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
