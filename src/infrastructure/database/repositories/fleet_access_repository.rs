//! SeaORM implementation of FleetAccessRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use super::{conflict_or_db_err, db_err};
use crate::domain::{
    DomainResult, FleetAccessFilter, FleetAccessRecord, FleetAccessRepository, FleetAccessStatus,
};
use crate::infrastructure::database::entities::fleet_access_record;
use crate::shared::{PageRequest, PaginatedResult};

pub struct SeaOrmFleetAccessRepository {
    db: DatabaseConnection,
}

impl SeaOrmFleetAccessRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: fleet_access_record::Model) -> FleetAccessRecord {
    let status = FleetAccessStatus::parse(&m.status).unwrap_or(if m.departure_at.is_some() {
        FleetAccessStatus::Dispatched
    } else {
        FleetAccessStatus::OnSite
    });
    FleetAccessRecord {
        id: m.id,
        fleet_profile_id: m.fleet_profile_id,
        arrival_at: m.arrival_at,
        departure_at: m.departure_at,
        hours_on_site: m.hours_on_site,
        cargo_quantity: m.cargo_quantity,
        observation: m.observation,
        entry_signature: m.entry_signature,
        exit_signature: m.exit_signature,
        status,
    }
}

// ── FleetAccessRepository impl ──────────────────────────────────

#[async_trait]
impl FleetAccessRepository for SeaOrmFleetAccessRepository {
    async fn open_record(&self, r: FleetAccessRecord) -> DomainResult<()> {
        debug!("Opening fleet access record {} for profile {}", r.id, r.fleet_profile_id);
        let model = fleet_access_record::ActiveModel {
            id: Set(r.id),
            fleet_profile_id: Set(r.fleet_profile_id.clone()),
            arrival_at: Set(r.arrival_at),
            departure_at: Set(None),
            hours_on_site: Set(None),
            cargo_quantity: Set(None),
            observation: Set(None),
            entry_signature: Set(r.entry_signature),
            exit_signature: Set(None),
            status: Set(FleetAccessStatus::OnSite.as_str().to_string()),
        };
        model.insert(&self.db).await.map_err(|e| {
            conflict_or_db_err(e, format!("Fleet profile {} is already on site", r.fleet_profile_id))
        })?;
        Ok(())
    }

    async fn find_open_for_profile(&self, fleet_profile_id: &str) -> DomainResult<Option<FleetAccessRecord>> {
        let model = fleet_access_record::Entity::find()
            .filter(fleet_access_record::Column::FleetProfileId.eq(fleet_profile_id))
            .filter(fleet_access_record::Column::DepartureAt.is_null())
            .order_by_desc(fleet_access_record::Column::ArrivalAt)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn close_record(&self, r: &FleetAccessRecord) -> DomainResult<bool> {
        debug!("Dispatching fleet access record {}", r.id);
        let result = fleet_access_record::Entity::update_many()
            .col_expr(fleet_access_record::Column::DepartureAt, Expr::value(r.departure_at))
            .col_expr(fleet_access_record::Column::HoursOnSite, Expr::value(r.hours_on_site))
            .col_expr(fleet_access_record::Column::CargoQuantity, Expr::value(r.cargo_quantity))
            .col_expr(
                fleet_access_record::Column::Observation,
                Expr::value(r.observation.clone()),
            )
            .col_expr(
                fleet_access_record::Column::ExitSignature,
                Expr::value(r.exit_signature.clone()),
            )
            .col_expr(fleet_access_record::Column::Status, Expr::value(r.status.as_str()))
            .filter(fleet_access_record::Column::Id.eq(r.id.as_str()))
            .filter(fleet_access_record::Column::DepartureAt.is_null())
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<FleetAccessRecord>> {
        let model = fleet_access_record::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn list(
        &self,
        filter: FleetAccessFilter,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<FleetAccessRecord>> {
        let mut query = fleet_access_record::Entity::find();

        if let Some(ref profile_id) = filter.fleet_profile_id {
            query = query.filter(fleet_access_record::Column::FleetProfileId.eq(profile_id.as_str()));
        }
        if let Some(status) = filter.status {
            query = query.filter(fleet_access_record::Column::Status.eq(status.as_str()));
        }
        if let Some(from) = filter.from {
            query = query.filter(fleet_access_record::Column::ArrivalAt.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(fleet_access_record::Column::ArrivalAt.lte(to));
        }

        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let models = query
            .order_by_desc(fleet_access_record::Column::ArrivalAt)
            .offset(page.offset())
            .limit(page.limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(PaginatedResult::new(
            models.into_iter().map(model_to_domain).collect(),
            total,
            page.page,
            page.limit,
        ))
    }

    async fn list_open(&self) -> DomainResult<Vec<FleetAccessRecord>> {
        let models = fleet_access_record::Entity::find()
            .filter(fleet_access_record::Column::DepartureAt.is_null())
            .order_by_asc(fleet_access_record::Column::ArrivalAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }
}
