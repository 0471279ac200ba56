//! Fleet access record domain entity

use chrono::{DateTime, Utc};

use crate::domain::attendance::elapsed_hours;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FleetAccessStatus {
    OnSite,
    Dispatched,
}

impl FleetAccessStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnSite => "on_site",
            Self::Dispatched => "dispatched",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "on_site" => Some(Self::OnSite),
            "dispatched" => Some(Self::Dispatched),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FleetAccessRecord {
    pub id: String,
    pub fleet_profile_id: String,
    pub arrival_at: DateTime<Utc>,
    pub departure_at: Option<DateTime<Utc>>,
    pub hours_on_site: Option<f64>,
    /// Declared cargo units on dispatch
    pub cargo_quantity: Option<i32>,
    pub observation: Option<String>,
    pub entry_signature: String,
    pub exit_signature: Option<String>,
    pub status: FleetAccessStatus,
}

impl FleetAccessRecord {
    pub fn arrive(
        fleet_profile_id: impl Into<String>,
        arrival_at: DateTime<Utc>,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            fleet_profile_id: fleet_profile_id.into(),
            arrival_at,
            departure_at: None,
            hours_on_site: None,
            cargo_quantity: None,
            observation: None,
            entry_signature: signature.into(),
            exit_signature: None,
            status: FleetAccessStatus::OnSite,
        }
    }

    pub fn is_open(&self) -> bool {
        self.departure_at.is_none()
    }

    pub fn dispatch(
        &mut self,
        departure_at: DateTime<Utc>,
        cargo_quantity: i32,
        observation: Option<String>,
        signature: impl Into<String>,
    ) {
        self.departure_at = Some(departure_at);
        self.hours_on_site = Some(elapsed_hours(self.arrival_at, departure_at));
        self.cargo_quantity = Some(cargo_quantity);
        self.observation = observation.filter(|o| !o.trim().is_empty());
        self.exit_signature = Some(signature.into());
        self.status = FleetAccessStatus::Dispatched;
    }
}

#[derive(Debug, Clone, Default)]
pub struct FleetAccessFilter {
    pub fleet_profile_id: Option<String>,
    pub status: Option<FleetAccessStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl FleetAccessFilter {
    pub fn matches(&self, r: &FleetAccessRecord) -> bool {
        if let Some(ref id) = self.fleet_profile_id {
            if &r.fleet_profile_id != id {
                return false;
            }
        }
        if let Some(status) = self.status {
            if r.status != status {
                return false;
            }
        }
        if let Some(from) = self.from {
            if r.arrival_at < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if r.arrival_at > to {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn dispatch_closes_record() {
        let arrival = Utc.with_ymd_and_hms(2024, 3, 1, 6, 0, 0).unwrap();
        let departure = Utc.with_ymd_and_hms(2024, 3, 1, 7, 45, 0).unwrap();
        let mut r = FleetAccessRecord::arrive("f-1", arrival, "sig-in");
        assert!(r.is_open());

        r.dispatch(departure, 12, Some("  ".into()), "sig-out");
        assert!(!r.is_open());
        assert_eq!(r.status, FleetAccessStatus::Dispatched);
        assert_eq!(r.hours_on_site, Some(1.75));
        assert_eq!(r.cargo_quantity, Some(12));
        assert_eq!(r.observation, None);
    }

    #[test]
    fn filter_by_status_and_range() {
        let arrival = Utc.with_ymd_and_hms(2024, 3, 1, 6, 0, 0).unwrap();
        let r = FleetAccessRecord::arrive("f-1", arrival, "sig");

        let open = FleetAccessFilter {
            status: Some(FleetAccessStatus::OnSite),
            ..Default::default()
        };
        assert!(open.matches(&r));

        let later = FleetAccessFilter {
            from: Some(arrival + chrono::Duration::hours(1)),
            ..Default::default()
        };
        assert!(!later.matches(&r));
    }
}
