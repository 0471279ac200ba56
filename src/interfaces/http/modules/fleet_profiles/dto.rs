//! Fleet profile DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::services::NewFleetProfile;
use crate::domain::{FleetProfile, FleetProfileFilter, FleetProfileUpdate};

#[derive(Debug, Serialize, ToSchema)]
pub struct FleetProfileDto {
    pub id: String,
    pub full_name: String,
    pub document_id: String,
    pub fleet_name: String,
    pub driver_count: i32,
    pub route_count: i32,
    pub is_active: bool,
    pub last_arrival_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FleetProfile> for FleetProfileDto {
    fn from(p: FleetProfile) -> Self {
        Self {
            id: p.id,
            full_name: p.full_name,
            document_id: p.document_id,
            fleet_name: p.fleet_name,
            driver_count: p.driver_count,
            route_count: p.route_count,
            is_active: p.is_active,
            last_arrival_at: p.last_arrival_at,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFleetProfileRequest {
    #[validate(length(min = 1, max = 120, message = "full name is required"))]
    pub full_name: String,
    #[validate(
        length(min = 1, max = 40, message = "document id is required"),
        does_not_contain(pattern = "|")
    )]
    pub document_id: String,
    /// 4-8 digit secret PIN
    #[validate(length(min = 4, max = 8, message = "PIN must be 4-8 digits"))]
    pub pin: String,
    #[validate(length(max = 120))]
    #[serde(default)]
    pub fleet_name: String,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub driver_count: i32,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub route_count: i32,
}

impl From<CreateFleetProfileRequest> for NewFleetProfile {
    fn from(r: CreateFleetProfileRequest) -> Self {
        Self {
            full_name: r.full_name,
            document_id: r.document_id,
            pin: r.pin,
            fleet_name: r.fleet_name,
            driver_count: r.driver_count,
            route_count: r.route_count,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateFleetProfileRequest {
    #[validate(length(min = 1, max = 120))]
    pub full_name: Option<String>,
    #[validate(length(min = 1, max = 40), does_not_contain(pattern = "|"))]
    pub document_id: Option<String>,
    #[validate(length(max = 120))]
    pub fleet_name: Option<String>,
    #[validate(range(min = 0))]
    pub driver_count: Option<i32>,
    #[validate(range(min = 0))]
    pub route_count: Option<i32>,
    pub is_active: Option<bool>,
}

impl From<UpdateFleetProfileRequest> for FleetProfileUpdate {
    fn from(r: UpdateFleetProfileRequest) -> Self {
        Self {
            full_name: r.full_name,
            document_id: r.document_id,
            fleet_name: r.fleet_name,
            driver_count: r.driver_count,
            route_count: r.route_count,
            is_active: r.is_active,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListFleetProfilesParams {
    /// Search in name, fleet name and document id
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl ListFleetProfilesParams {
    pub fn filter(&self) -> FleetProfileFilter {
        FleetProfileFilter {
            search: self.search.clone().filter(|s| !s.trim().is_empty()),
            is_active: self.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_id_rejects_badge_separator() {
        let mut req: CreateFleetProfileRequest = serde_json::from_value(serde_json::json!({
            "full_name": "Luis Vera",
            "document_id": "TR|9",
            "pin": "5555"
        }))
        .unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("document_id"));

        req.document_id = "TR-9".into();
        assert!(req.validate().is_ok());
    }
}
