//! SeaORM implementation of WorkerRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use super::{conflict_or_db_err, db_err};
use crate::domain::{DomainError, DomainResult, Worker, WorkerFilter, WorkerRepository, WorkerRole};
use crate::infrastructure::database::entities::worker;
use crate::shared::{PageRequest, PaginatedResult};

pub struct SeaOrmWorkerRepository {
    db: DatabaseConnection,
}

impl SeaOrmWorkerRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn role_to_entity(role: WorkerRole) -> worker::WorkerRole {
    match role {
        WorkerRole::Worker => worker::WorkerRole::Worker,
        WorkerRole::Supervisor => worker::WorkerRole::Supervisor,
        WorkerRole::Admin => worker::WorkerRole::Admin,
    }
}

fn role_to_domain(role: worker::WorkerRole) -> WorkerRole {
    match role {
        worker::WorkerRole::Worker => WorkerRole::Worker,
        worker::WorkerRole::Supervisor => WorkerRole::Supervisor,
        worker::WorkerRole::Admin => WorkerRole::Admin,
    }
}

fn model_to_domain(m: worker::Model) -> Worker {
    Worker {
        id: m.id,
        full_name: m.full_name,
        document_id: m.document_id,
        email: m.email,
        pin_hash: m.pin_hash,
        password_hash: m.password_hash,
        role: role_to_domain(m.role),
        is_active: m.is_active,
        on_site: m.on_site,
        last_entry_at: m.last_entry_at,
        last_exit_at: m.last_exit_at,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn domain_to_active(w: Worker) -> worker::ActiveModel {
    worker::ActiveModel {
        id: Set(w.id),
        full_name: Set(w.full_name),
        document_id: Set(w.document_id),
        email: Set(w.email),
        pin_hash: Set(w.pin_hash),
        password_hash: Set(w.password_hash),
        role: Set(role_to_entity(w.role)),
        is_active: Set(w.is_active),
        on_site: Set(w.on_site),
        last_entry_at: Set(w.last_entry_at),
        last_exit_at: Set(w.last_exit_at),
        created_at: Set(w.created_at),
        updated_at: Set(w.updated_at),
    }
}

/// `lower(column) LIKE %needle%`
fn lower_contains(col: worker::Column, needle: &str) -> sea_orm::sea_query::SimpleExpr {
    Expr::expr(Func::lower(Expr::col(col))).like(format!("%{}%", needle.to_lowercase()))
}

// ── WorkerRepository impl ───────────────────────────────────────

#[async_trait]
impl WorkerRepository for SeaOrmWorkerRepository {
    async fn create(&self, w: Worker) -> DomainResult<()> {
        debug!("Creating worker: {} ({})", w.full_name, w.id);
        domain_to_active(w)
            .insert(&self.db)
            .await
            .map_err(|e| conflict_or_db_err(e, "Email or document id already registered"))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Worker>> {
        let model = worker::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<Worker>> {
        let model = worker::Entity::find()
            .filter(Expr::expr(Func::lower(Expr::col(worker::Column::Email))).eq(email.trim().to_lowercase()))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_document(&self, document_id: &str) -> DomainResult<Option<Worker>> {
        let model = worker::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(worker::Column::DocumentId)))
                    .eq(document_id.trim().to_lowercase()),
            )
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn search_identifier(&self, identifier: &str) -> DomainResult<Vec<Worker>> {
        let needle = identifier.trim();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let models = worker::Entity::find()
            .filter(
                Condition::any()
                    .add(lower_contains(worker::Column::Email, needle))
                    .add(lower_contains(worker::Column::DocumentId, needle)),
            )
            .all(&self.db)
            .await
            .map_err(db_err)?;

        // LIKE treats `_` and `%` as wildcards; re-check literally
        Ok(models
            .into_iter()
            .map(model_to_domain)
            .filter(|w| w.matches_partially(needle))
            .collect())
    }

    async fn update(&self, w: Worker) -> DomainResult<()> {
        debug!("Updating worker: {}", w.id);
        let id = w.id.clone();
        domain_to_active(w).update(&self.db).await.map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => DomainError::not_found("Worker", "id", id),
            other => conflict_or_db_err(other, "Email or document id already registered"),
        })?;
        Ok(())
    }

    async fn set_presence(&self, id: &str, on_site: bool, at: DateTime<Utc>) -> DomainResult<()> {
        let stamp = if on_site {
            worker::Column::LastEntryAt
        } else {
            worker::Column::LastExitAt
        };
        let result = worker::Entity::update_many()
            .col_expr(worker::Column::OnSite, Expr::value(on_site))
            .col_expr(stamp, Expr::value(at))
            .col_expr(worker::Column::UpdatedAt, Expr::value(at))
            .filter(worker::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Worker", "id", id));
        }
        Ok(())
    }

    async fn list(&self, filter: WorkerFilter, page: PageRequest) -> DomainResult<PaginatedResult<Worker>> {
        let mut query = worker::Entity::find();

        if let Some(ref search) = filter.search {
            query = query.filter(
                Condition::any()
                    .add(lower_contains(worker::Column::FullName, search))
                    .add(lower_contains(worker::Column::Email, search))
                    .add(lower_contains(worker::Column::DocumentId, search)),
            );
        }
        if let Some(role) = filter.role {
            query = query.filter(worker::Column::Role.eq(role_to_entity(role)));
        }
        if let Some(active) = filter.is_active {
            query = query.filter(worker::Column::IsActive.eq(active));
        }
        if let Some(on_site) = filter.on_site {
            query = query.filter(worker::Column::OnSite.eq(on_site));
        }

        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let models = query
            .order_by_asc(worker::Column::FullName)
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

    async fn count(&self) -> DomainResult<u64> {
        worker::Entity::find().count(&self.db).await.map_err(db_err)
    }
}
