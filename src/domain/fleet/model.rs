//! Fleet profile domain entity

use chrono::{DateTime, Utc};

/// Transport operator allowed to bring vehicles on site
#[derive(Debug, Clone)]
pub struct FleetProfile {
    pub id: String,
    pub full_name: String,
    pub document_id: String,
    /// bcrypt hash of the secret PIN
    pub secret_pin_hash: String,
    pub fleet_name: String,
    pub driver_count: i32,
    pub route_count: i32,
    pub is_active: bool,
    pub last_arrival_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FleetProfile {
    pub fn new(
        full_name: impl Into<String>,
        document_id: impl Into<String>,
        secret_pin_hash: impl Into<String>,
        fleet_name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            full_name: full_name.into(),
            document_id: document_id.into(),
            secret_pin_hash: secret_pin_hash.into(),
            fleet_name: fleet_name.into(),
            driver_count: 0,
            route_count: 0,
            is_active: true,
            last_arrival_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FleetProfileUpdate {
    pub full_name: Option<String>,
    pub document_id: Option<String>,
    pub fleet_name: Option<String>,
    pub driver_count: Option<i32>,
    pub route_count: Option<i32>,
    pub is_active: Option<bool>,
}

impl FleetProfileUpdate {
    pub fn apply(self, profile: &mut FleetProfile) {
        if let Some(v) = self.full_name {
            profile.full_name = v;
        }
        if let Some(v) = self.document_id {
            profile.document_id = v.trim().to_string();
        }
        if let Some(v) = self.fleet_name {
            profile.fleet_name = v;
        }
        if let Some(v) = self.driver_count {
            profile.driver_count = v;
        }
        if let Some(v) = self.route_count {
            profile.route_count = v;
        }
        if let Some(v) = self.is_active {
            profile.is_active = v;
        }
        profile.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Default)]
pub struct FleetProfileFilter {
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

impl FleetProfileFilter {
    pub fn matches(&self, profile: &FleetProfile) -> bool {
        if let Some(ref search) = self.search {
            let needle = search.to_lowercase();
            if !profile.full_name.to_lowercase().contains(&needle)
                && !profile.fleet_name.to_lowercase().contains(&needle)
                && !profile.document_id.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if let Some(active) = self.is_active {
            if profile.is_active != active {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_applies_only_given_fields() {
        let mut p = FleetProfile::new("Luis Ramos", "F-100", "hash", "Transportes Sur");
        FleetProfileUpdate {
            driver_count: Some(4),
            is_active: Some(false),
            ..Default::default()
        }
        .apply(&mut p);
        assert_eq!(p.driver_count, 4);
        assert_eq!(p.route_count, 0);
        assert!(!p.is_active);
        assert_eq!(p.fleet_name, "Transportes Sur");
    }

    #[test]
    fn filter_searches_names_and_document() {
        let p = FleetProfile::new("Luis Ramos", "F-100", "hash", "Transportes Sur");
        let by_fleet = FleetProfileFilter {
            search: Some("sur".into()),
            ..Default::default()
        };
        assert!(by_fleet.matches(&p));
        let inactive_only = FleetProfileFilter {
            is_active: Some(false),
            ..Default::default()
        };
        assert!(!inactive_only.matches(&p));
    }
}
