//! Fleet access record entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "fleet_access_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub fleet_profile_id: String,

    pub arrival_at: DateTimeUtc,

    #[sea_orm(nullable)]
    pub departure_at: Option<DateTimeUtc>,

    #[sea_orm(nullable)]
    pub hours_on_site: Option<f64>,

    #[sea_orm(nullable)]
    pub cargo_quantity: Option<i32>,

    #[sea_orm(nullable)]
    pub observation: Option<String>,

    pub entry_signature: String,

    #[sea_orm(nullable)]
    pub exit_signature: Option<String>,

    /// on_site | dispatched
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::fleet_profile::Entity",
        from = "Column::FleetProfileId",
        to = "super::fleet_profile::Column::Id"
    )]
    FleetProfile,
}

impl Related<super::fleet_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FleetProfile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
