//! Geofence: circular boundary around the configured site origin.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Great-circle distance in meters (haversine).
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geofence {
    pub origin: GeoPoint,
    pub radius_m: f64,
}

/// Outcome of a proximity check
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeofenceCheck {
    pub distance_m: f64,
    pub radius_m: f64,
    pub inside: bool,
}

impl Geofence {
    pub fn new(origin: GeoPoint, radius_m: f64) -> Self {
        Self { origin, radius_m }
    }

    /// A point exactly on the boundary counts as inside.
    pub fn check(&self, position: &GeoPoint) -> GeofenceCheck {
        let distance_m = self.origin.distance_to(position);
        GeofenceCheck {
            distance_m,
            radius_m: self.radius_m,
            inside: distance_m <= self.radius_m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lima() -> GeoPoint {
        GeoPoint::new(-12.0464, -77.0428)
    }

    #[test]
    fn same_point_is_zero_distance() {
        assert_eq!(lima().distance_to(&lima()), 0.0);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(1.0, 0.0);
        let d = a.distance_to(&b);
        assert!((d - 111_195.0).abs() < 10.0, "distance was {}", d);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = lima();
        let b = GeoPoint::new(-12.1, -77.0);
        assert!((a.distance_to(&b) - b.distance_to(&a)).abs() < 1e-6);
    }

    #[test]
    fn inside_and_outside_radius() {
        let fence = Geofence::new(lima(), 100.0);
        // ~55 m north
        let near = GeoPoint::new(-12.0459, -77.0428);
        // ~1.1 km north
        let far = GeoPoint::new(-12.0364, -77.0428);

        let near_check = fence.check(&near);
        assert!(near_check.inside);
        assert!(near_check.distance_m > 50.0 && near_check.distance_m < 60.0);

        let far_check = fence.check(&far);
        assert!(!far_check.inside);
        assert!(far_check.distance_m > 1_000.0);
        assert_eq!(far_check.radius_m, 100.0);
    }

    #[test]
    fn boundary_counts_as_inside() {
        let origin = lima();
        let other = GeoPoint::new(-12.0459, -77.0428);
        let exact = origin.distance_to(&other);
        let fence = Geofence::new(origin, exact);
        assert!(fence.check(&other).inside);
    }

    #[test]
    fn coordinate_validation() {
        assert!(lima().is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, -181.0).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
    }
}
