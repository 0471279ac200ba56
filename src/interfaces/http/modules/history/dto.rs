//! History DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::application::services::{OnSiteSummary, OpenFleetView, OpenSessionView};
use crate::domain::{
    AttendanceSession, DomainError, FleetAccessFilter, FleetAccessRecord, FleetAccessStatus,
    SessionFilter, SessionStatus,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceSessionDto {
    pub id: String,
    pub worker_id: String,
    pub entry_at: DateTime<Utc>,
    pub exit_at: Option<DateTime<Utc>>,
    pub hours_worked: Option<f64>,
    pub entry_signature: String,
    pub exit_signature: Option<String>,
    /// active | finished
    pub status: String,
}

impl From<AttendanceSession> for AttendanceSessionDto {
    fn from(s: AttendanceSession) -> Self {
        Self {
            status: s.status.as_str().to_string(),
            id: s.id,
            worker_id: s.worker_id,
            entry_at: s.entry_at,
            exit_at: s.exit_at,
            hours_worked: s.hours_worked,
            entry_signature: s.entry_signature,
            exit_signature: s.exit_signature,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FleetAccessRecordDto {
    pub id: String,
    pub fleet_profile_id: String,
    pub arrival_at: DateTime<Utc>,
    pub departure_at: Option<DateTime<Utc>>,
    pub hours_on_site: Option<f64>,
    pub cargo_quantity: Option<i32>,
    pub observation: Option<String>,
    pub entry_signature: String,
    pub exit_signature: Option<String>,
    /// on_site | dispatched
    pub status: String,
}

impl From<FleetAccessRecord> for FleetAccessRecordDto {
    fn from(r: FleetAccessRecord) -> Self {
        Self {
            status: r.status.as_str().to_string(),
            id: r.id,
            fleet_profile_id: r.fleet_profile_id,
            arrival_at: r.arrival_at,
            departure_at: r.departure_at,
            hours_on_site: r.hours_on_site,
            cargo_quantity: r.cargo_quantity,
            observation: r.observation,
            entry_signature: r.entry_signature,
            exit_signature: r.exit_signature,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OnSiteWorkerDto {
    pub worker_name: String,
    pub hours_elapsed: f64,
    pub over_limit: bool,
    pub session: AttendanceSessionDto,
}

impl From<OpenSessionView> for OnSiteWorkerDto {
    fn from(v: OpenSessionView) -> Self {
        Self {
            worker_name: v.worker_name,
            hours_elapsed: v.hours_elapsed,
            over_limit: v.over_limit,
            session: v.session.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OnSiteFleetDto {
    pub full_name: String,
    pub fleet_name: String,
    pub hours_elapsed: f64,
    pub record: FleetAccessRecordDto,
}

impl From<OpenFleetView> for OnSiteFleetDto {
    fn from(v: OpenFleetView) -> Self {
        Self {
            full_name: v.full_name,
            fleet_name: v.fleet_name,
            hours_elapsed: v.hours_elapsed,
            record: v.record.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OnSiteSummaryDto {
    pub generated_at: DateTime<Utc>,
    pub max_labor_hours: f64,
    pub workers_on_site: usize,
    pub fleets_on_site: usize,
    pub over_limit: usize,
    pub workers: Vec<OnSiteWorkerDto>,
    pub fleets: Vec<OnSiteFleetDto>,
}

impl From<OnSiteSummary> for OnSiteSummaryDto {
    fn from(s: OnSiteSummary) -> Self {
        Self {
            over_limit: s.over_limit_count(),
            workers_on_site: s.workers.len(),
            fleets_on_site: s.fleets.len(),
            generated_at: s.generated_at,
            max_labor_hours: s.max_labor_hours,
            workers: s.workers.into_iter().map(Into::into).collect(),
            fleets: s.fleets.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SessionQueryParams {
    pub worker_id: Option<String>,
    /// active | finished
    pub status: Option<String>,
    /// Entries at or after this instant (RFC 3339)
    pub from: Option<DateTime<Utc>>,
    /// Entries at or before this instant (RFC 3339)
    pub to: Option<DateTime<Utc>>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl SessionQueryParams {
    pub fn filter(&self) -> Result<SessionFilter, DomainError> {
        let status = match self.status.as_deref() {
            Some(raw) => Some(SessionStatus::parse(raw).ok_or_else(|| {
                DomainError::Validation(format!("Unknown session status '{}'", raw))
            })?),
            None => None,
        };
        Ok(SessionFilter {
            worker_id: self.worker_id.clone(),
            status,
            from: self.from,
            to: self.to,
        })
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct FleetAccessQueryParams {
    pub fleet_profile_id: Option<String>,
    /// on_site | dispatched
    pub status: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl FleetAccessQueryParams {
    pub fn filter(&self) -> Result<FleetAccessFilter, DomainError> {
        let status = match self.status.as_deref() {
            Some(raw) => Some(FleetAccessStatus::parse(raw).ok_or_else(|| {
                DomainError::Validation(format!("Unknown fleet access status '{}'", raw))
            })?),
            None => None,
        };
        Ok(FleetAccessFilter {
            fleet_profile_id: self.fleet_profile_id.clone(),
            status,
            from: self.from,
            to: self.to,
        })
    }
}
