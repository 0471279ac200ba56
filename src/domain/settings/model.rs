//! Typed view over the settings table

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::geofence::{GeoPoint, Geofence};
use crate::shared::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    GeofenceLat,
    GeofenceLon,
    GeofenceRadiusM,
    QrTokenTtlSecs,
    InactivityTimeoutSecs,
    MaxLaborHours,
    EffectivenessThreshold,
    CompanyName,
}

impl SettingKey {
    pub const ALL: [SettingKey; 8] = [
        SettingKey::GeofenceLat,
        SettingKey::GeofenceLon,
        SettingKey::GeofenceRadiusM,
        SettingKey::QrTokenTtlSecs,
        SettingKey::InactivityTimeoutSecs,
        SettingKey::MaxLaborHours,
        SettingKey::EffectivenessThreshold,
        SettingKey::CompanyName,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GeofenceLat => "geofence_lat",
            Self::GeofenceLon => "geofence_lon",
            Self::GeofenceRadiusM => "geofence_radius_m",
            Self::QrTokenTtlSecs => "qr_token_ttl_secs",
            Self::InactivityTimeoutSecs => "inactivity_timeout_secs",
            Self::MaxLaborHours => "max_labor_hours",
            Self::EffectivenessThreshold => "effectiveness_threshold",
            Self::CompanyName => "company_name",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

/// Effective settings: defaults overlaid with stored rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSettings {
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

/// Upper bound for `qr_token_ttl_secs`: one year
pub const MAX_BADGE_TTL_SECS: i64 = 365 * 24 * 3600;

impl SystemSettings {
    /// Parse and apply one stored value.
    pub fn apply(&mut self, key: SettingKey, value: &str) -> Result<(), DomainError> {
        let value = value.trim();
        match key {
            SettingKey::GeofenceLat => {
                let lat = parse_f64(key, value)?;
                if !(-90.0..=90.0).contains(&lat) {
                    return Err(out_of_range(key));
                }
                self.geofence_lat = lat;
            }
            SettingKey::GeofenceLon => {
                let lon = parse_f64(key, value)?;
                if !(-180.0..=180.0).contains(&lon) {
                    return Err(out_of_range(key));
                }
                self.geofence_lon = lon;
            }
            SettingKey::GeofenceRadiusM => {
                let r = parse_f64(key, value)?;
                if r <= 0.0 {
                    return Err(out_of_range(key));
                }
                self.geofence_radius_m = r;
            }
            SettingKey::QrTokenTtlSecs => {
                let ttl = parse_non_negative(key, value)?;
                if ttl > MAX_BADGE_TTL_SECS {
                    return Err(out_of_range(key));
                }
                self.qr_token_ttl_secs = ttl;
            }
            SettingKey::InactivityTimeoutSecs => {
                self.inactivity_timeout_secs = parse_non_negative(key, value)?
            }
            SettingKey::MaxLaborHours => {
                let h = parse_f64(key, value)?;
                if h <= 0.0 {
                    return Err(out_of_range(key));
                }
                self.max_labor_hours = h;
            }
            SettingKey::EffectivenessThreshold => {
                let t = parse_f64(key, value)?;
                if !(0.0..=1.0).contains(&t) {
                    return Err(out_of_range(key));
                }
                self.effectiveness_threshold = t;
            }
            SettingKey::CompanyName => {
                if value.is_empty() {
                    return Err(DomainError::Validation("company_name cannot be empty".into()));
                }
                self.company_name = value.to_string();
            }
        }
        Ok(())
    }

    /// Overlay stored rows. Unknown keys are skipped; malformed values are
    /// logged and left at their default.
    pub fn overlay(mut self, stored: &HashMap<String, String>) -> Self {
        for (k, v) in stored {
            let Some(key) = SettingKey::parse(k) else {
                continue;
            };
            if let Err(e) = self.apply(key, v) {
                log::warn!("Ignoring stored setting {}: {}", k, e);
            }
        }
        self
    }

    pub fn value_of(&self, key: SettingKey) -> String {
        match key {
            SettingKey::GeofenceLat => self.geofence_lat.to_string(),
            SettingKey::GeofenceLon => self.geofence_lon.to_string(),
            SettingKey::GeofenceRadiusM => self.geofence_radius_m.to_string(),
            SettingKey::QrTokenTtlSecs => self.qr_token_ttl_secs.to_string(),
            SettingKey::InactivityTimeoutSecs => self.inactivity_timeout_secs.to_string(),
            SettingKey::MaxLaborHours => self.max_labor_hours.to_string(),
            SettingKey::EffectivenessThreshold => self.effectiveness_threshold.to_string(),
            SettingKey::CompanyName => self.company_name.clone(),
        }
    }

    pub fn geofence(&self) -> Geofence {
        Geofence::new(
            GeoPoint::new(self.geofence_lat, self.geofence_lon),
            self.geofence_radius_m,
        )
    }
}

fn parse_f64(key: SettingKey, value: &str) -> Result<f64, DomainError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| DomainError::Validation(format!("{} must be a number", key.as_str())))
}

fn parse_non_negative(key: SettingKey, value: &str) -> Result<i64, DomainError> {
    match value.parse::<i64>() {
        Ok(v) if v >= 0 => Ok(v),
        _ => Err(DomainError::Validation(format!(
            "{} must be a non-negative integer",
            key.as_str()
        ))),
    }
}

fn out_of_range(key: SettingKey) -> DomainError {
    DomainError::Validation(format!("{} is out of range", key.as_str()))
}
