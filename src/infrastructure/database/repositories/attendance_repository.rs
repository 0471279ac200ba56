//! SeaORM implementation of AttendanceRepository
//!
//! "One open session per worker" is enforced by the partial unique index
//! `uq_attendance_sessions_open_worker`; closing is a conditional update on
//! `exit_at IS NULL`, so two concurrent exits cannot both succeed.

use async_trait::async_trait;
use log::debug;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use super::{conflict_or_db_err, db_err};
use crate::domain::{AttendanceRepository, AttendanceSession, DomainResult, SessionFilter, SessionStatus};
use crate::infrastructure::database::entities::attendance_session;
use crate::shared::{PageRequest, PaginatedResult};

pub struct SeaOrmAttendanceRepository {
    db: DatabaseConnection,
}

impl SeaOrmAttendanceRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: attendance_session::Model) -> AttendanceSession {
    let status = SessionStatus::parse(&m.status).unwrap_or(if m.exit_at.is_some() {
        SessionStatus::Finished
    } else {
        SessionStatus::Active
    });
    AttendanceSession {
        id: m.id,
        worker_id: m.worker_id,
        entry_at: m.entry_at,
        exit_at: m.exit_at,
        hours_worked: m.hours_worked,
        entry_signature: m.entry_signature,
        exit_signature: m.exit_signature,
        status,
    }
}

// ── AttendanceRepository impl ───────────────────────────────────

#[async_trait]
impl AttendanceRepository for SeaOrmAttendanceRepository {
    async fn open_session(&self, s: AttendanceSession) -> DomainResult<()> {
        debug!("Opening attendance session {} for worker {}", s.id, s.worker_id);
        let model = attendance_session::ActiveModel {
            id: Set(s.id),
            worker_id: Set(s.worker_id.clone()),
            entry_at: Set(s.entry_at),
            exit_at: Set(None),
            hours_worked: Set(None),
            entry_signature: Set(s.entry_signature),
            exit_signature: Set(None),
            status: Set(SessionStatus::Active.as_str().to_string()),
        };
        model.insert(&self.db).await.map_err(|e| {
            conflict_or_db_err(e, format!("Worker {} already has an open session", s.worker_id))
        })?;
        Ok(())
    }

    async fn find_open_for_worker(&self, worker_id: &str) -> DomainResult<Option<AttendanceSession>> {
        let model = attendance_session::Entity::find()
            .filter(attendance_session::Column::WorkerId.eq(worker_id))
            .filter(attendance_session::Column::ExitAt.is_null())
            .order_by_desc(attendance_session::Column::EntryAt)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn close_session(&self, s: &AttendanceSession) -> DomainResult<bool> {
        debug!("Closing attendance session {}", s.id);
        let result = attendance_session::Entity::update_many()
            .col_expr(attendance_session::Column::ExitAt, Expr::value(s.exit_at))
            .col_expr(attendance_session::Column::HoursWorked, Expr::value(s.hours_worked))
            .col_expr(
                attendance_session::Column::ExitSignature,
                Expr::value(s.exit_signature.clone()),
            )
            .col_expr(attendance_session::Column::Status, Expr::value(s.status.as_str()))
            .filter(attendance_session::Column::Id.eq(s.id.as_str()))
            .filter(attendance_session::Column::ExitAt.is_null())
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<AttendanceSession>> {
        let model = attendance_session::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn list(
        &self,
        filter: SessionFilter,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<AttendanceSession>> {
        let mut query = attendance_session::Entity::find();

        if let Some(ref worker_id) = filter.worker_id {
            query = query.filter(attendance_session::Column::WorkerId.eq(worker_id.as_str()));
        }
        if let Some(status) = filter.status {
            query = query.filter(attendance_session::Column::Status.eq(status.as_str()));
        }
        if let Some(from) = filter.from {
            query = query.filter(attendance_session::Column::EntryAt.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(attendance_session::Column::EntryAt.lte(to));
        }

        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let models = query
            .order_by_desc(attendance_session::Column::EntryAt)
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

    async fn list_open(&self) -> DomainResult<Vec<AttendanceSession>> {
        let models = attendance_session::Entity::find()
            .filter(attendance_session::Column::ExitAt.is_null())
            .order_by_asc(attendance_session::Column::EntryAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }
}
