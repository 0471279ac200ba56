//! SeaORM implementation of FleetProfileRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use super::{conflict_or_db_err, db_err};
use crate::domain::{DomainError, DomainResult, FleetProfile, FleetProfileFilter, FleetProfileRepository};
use crate::infrastructure::database::entities::fleet_profile;
use crate::shared::{PageRequest, PaginatedResult};

pub struct SeaOrmFleetProfileRepository {
    db: DatabaseConnection,
}

impl SeaOrmFleetProfileRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: fleet_profile::Model) -> FleetProfile {
    FleetProfile {
        id: m.id,
        full_name: m.full_name,
        document_id: m.document_id,
        secret_pin_hash: m.secret_pin_hash,
        fleet_name: m.fleet_name,
        driver_count: m.driver_count,
        route_count: m.route_count,
        is_active: m.is_active,
        last_arrival_at: m.last_arrival_at,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn domain_to_active(p: FleetProfile) -> fleet_profile::ActiveModel {
    fleet_profile::ActiveModel {
        id: Set(p.id),
        full_name: Set(p.full_name),
        document_id: Set(p.document_id),
        secret_pin_hash: Set(p.secret_pin_hash),
        fleet_name: Set(p.fleet_name),
        driver_count: Set(p.driver_count),
        route_count: Set(p.route_count),
        is_active: Set(p.is_active),
        last_arrival_at: Set(p.last_arrival_at),
        created_at: Set(p.created_at),
        updated_at: Set(p.updated_at),
    }
}

// ── FleetProfileRepository impl ─────────────────────────────────

#[async_trait]
impl FleetProfileRepository for SeaOrmFleetProfileRepository {
    async fn create(&self, profile: FleetProfile) -> DomainResult<()> {
        debug!("Creating fleet profile: {} ({})", profile.full_name, profile.fleet_name);
        domain_to_active(profile)
            .insert(&self.db)
            .await
            .map_err(|e| conflict_or_db_err(e, "Document id already registered"))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<FleetProfile>> {
        let model = fleet_profile::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_document(&self, document_id: &str) -> DomainResult<Option<FleetProfile>> {
        let model = fleet_profile::Entity::find()
            .filter(fleet_profile::Column::DocumentId.eq(document_id.trim()))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn update(&self, profile: FleetProfile) -> DomainResult<()> {
        debug!("Updating fleet profile: {}", profile.id);
        let id = profile.id.clone();
        domain_to_active(profile).update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => DomainError::not_found("FleetProfile", "id", id),
            other => conflict_or_db_err(other, "Document id already registered"),
        })?;
        Ok(())
    }

    async fn stamp_arrival(&self, id: &str, at: DateTime<Utc>) -> DomainResult<()> {
        let result = fleet_profile::Entity::update_many()
            .col_expr(fleet_profile::Column::LastArrivalAt, Expr::value(at))
            .col_expr(fleet_profile::Column::UpdatedAt, Expr::value(at))
            .filter(fleet_profile::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(DomainError::not_found("FleetProfile", "id", id));
        }
        Ok(())
    }

    async fn list(
        &self,
        filter: FleetProfileFilter,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<FleetProfile>> {
        let mut query = fleet_profile::Entity::find();

        if let Some(ref search) = filter.search {
            let pattern = format!("%{}%", search.to_lowercase());
            let mut any = Condition::any();
            for col in [
                fleet_profile::Column::FullName,
                fleet_profile::Column::FleetName,
                fleet_profile::Column::DocumentId,
            ] {
                any = any.add(Expr::expr(Func::lower(Expr::col(col))).like(pattern.clone()));
            }
            query = query.filter(any);
        }
        if let Some(active) = filter.is_active {
            query = query.filter(fleet_profile::Column::IsActive.eq(active));
        }

        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let models = query
            .order_by_asc(fleet_profile::Column::FullName)
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::repositories::test_support::test_db;

    #[tokio::test]
    async fn document_is_unique_and_exact() {
        let repo = SeaOrmFleetProfileRepository::new(test_db().await);
        let p = FleetProfile::new("Luis Ramos", "F-100", "hash", "Transportes Sur");
        repo.create(p.clone()).await.unwrap();

        assert!(repo.find_by_document("F-100").await.unwrap().is_some());
        assert!(repo.find_by_document("F-10").await.unwrap().is_none());

        let dup = FleetProfile::new("Other", "F-100", "hash", "Other Fleet");
        assert!(matches!(repo.create(dup).await, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn stamp_and_search() {
        let repo = SeaOrmFleetProfileRepository::new(test_db().await);
        let p = FleetProfile::new("Luis Ramos", "F-100", "hash", "Transportes Sur");
        repo.create(p.clone()).await.unwrap();
        repo.create(FleetProfile::new("Marta Gil", "F-200", "hash", "Carga Norte"))
            .await
            .unwrap();

        let at = Utc::now();
        repo.stamp_arrival(&p.id, at).await.unwrap();
        let stored = repo.find_by_id(&p.id).await.unwrap().unwrap();
        assert!(stored.last_arrival_at.is_some());

        let page = repo
            .list(
                FleetProfileFilter {
                    search: Some("norte".into()),
                    ..Default::default()
                },
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].full_name, "Marta Gil");
    }
}
