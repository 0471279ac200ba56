//! Health check handler

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::RepositoryProvider;

#[derive(Clone)]
pub struct HealthState {
    /// `None` when running on the in-memory store
    pub db: Option<DatabaseConnection>,
    pub repos: Arc<dyn RepositoryProvider>,
    pub started_at: Arc<Instant>,
}

/// Service health response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub database: ComponentHealth,
    /// Open attendance sessions
    pub workers_on_site: Option<usize>,
    /// Open fleet access records
    pub fleets_on_site: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ComponentHealth {
    /// ok | error | in_memory
    pub status: String,
    pub latency_ms: Option<u64>,
}

async fn ping(db: &DatabaseConnection) -> ComponentHealth {
    let start = Instant::now();
    match db
        .execute(Statement::from_string(
            db.get_database_backend(),
            "SELECT 1".to_string(),
        ))
        .await
    {
        Ok(_) => ComponentHealth {
            status: "ok".to_string(),
            latency_ms: Some(start.elapsed().as_millis() as u64),
        },
        Err(e) => {
            tracing::warn!(error = %e, "Database ping failed");
            ComponentHealth {
                status: "error".to_string(),
                latency_ms: None,
            }
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is degraded", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let database = match &state.db {
        Some(db) => ping(db).await,
        None => ComponentHealth {
            status: "in_memory".to_string(),
            latency_ms: None,
        },
    };

    let workers_on_site = state.repos.attendance().list_open().await.ok().map(|v| v.len());
    let fleets_on_site = state.repos.fleet_access().list_open().await.ok().map(|v| v.len());

    let healthy = database.status != "error" && workers_on_site.is_some();
    let (http_status, status) = if healthy {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        http_status,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.started_at.elapsed().as_secs(),
            database,
            workers_on_site,
            fleets_on_site,
        }),
    )
}
