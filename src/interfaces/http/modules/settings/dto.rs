//! Settings DTOs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::SystemSettings;

#[derive(Debug, Serialize, ToSchema)]
pub struct SettingsDto {
    pub geofence_lat: f64,
    pub geofence_lon: f64,
    pub geofence_radius_m: f64,
    /// Badge validity in seconds; 0 disables expiry
    pub qr_token_ttl_secs: i64,
    pub inactivity_timeout_secs: i64,
    pub max_labor_hours: f64,
    pub effectiveness_threshold: f64,
    pub company_name: String,
}

impl From<SystemSettings> for SettingsDto {
    fn from(s: SystemSettings) -> Self {
        Self {
            geofence_lat: s.geofence_lat,
            geofence_lon: s.geofence_lon,
            geofence_radius_m: s.geofence_radius_m,
            qr_token_ttl_secs: s.qr_token_ttl_secs,
            inactivity_timeout_secs: s.inactivity_timeout_secs,
            max_labor_hours: s.max_labor_hours,
            effectiveness_threshold: s.effectiveness_threshold,
            company_name: s.company_name,
        }
    }
}

/// Partial update. Keys are setting names, values may be JSON numbers or
/// strings.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSettingsRequest {
    #[schema(value_type = Object, example = json!({"geofence_radius_m": 150, "company_name": "Acme"}))]
    pub values: HashMap<String, serde_json::Value>,
}

impl UpdateSettingsRequest {
    /// Flatten JSON values into the string form the settings table stores
    pub fn changes(self) -> Vec<(String, String)> {
        let mut changes: Vec<(String, String)> = self
            .values
            .into_iter()
            .map(|(key, value)| {
                let raw = match value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, raw)
            })
            .collect();
        changes.sort_by(|a, b| a.0.cmp(&b.0));
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_are_stringified() {
        let req: UpdateSettingsRequest = serde_json::from_str(
            r#"{"values":{"geofence_radius_m":150.5,"company_name":"Acme","qr_token_ttl_secs":60}}"#,
        )
        .unwrap();
        assert_eq!(
            req.changes(),
            vec![
                ("company_name".to_string(), "Acme".to_string()),
                ("geofence_radius_m".to_string(), "150.5".to_string()),
                ("qr_token_ttl_secs".to_string(), "60".to_string()),
            ]
        );
    }
}
