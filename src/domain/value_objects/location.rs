use std::fmt;

use serde::{Deserialize, Serialize};

use crate::shared::{AppError, Result};

/// Bucket granularity: two decimal places is roughly 1.1 km at the equator,
/// coarse enough that GPS jitter never moves a coordinate across buckets.
const BUCKET_SCALE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(AppError::Validation(format!(
                "latitude out of range: {latitude}"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(AppError::Validation(format!(
                "longitude out of range: {longitude}"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Haversine distance in meters.
    pub fn distance_meters(&self, other: &Coordinate) -> f64 {
        const EARTH_RADIUS_KM: f64 = 6371.0;
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.latitude.to_radians().cos()
                * other.latitude.to_radians().cos()
                * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c * 1000.0
    }
}

/// Coordinate rounded to a fixed grid. Only a bucket change counts as
/// "location changed enough to matter" for cache invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationBucket {
    lat_centi: i32,
    lon_centi: i32,
}

impl LocationBucket {
    pub fn from_coordinate(coordinate: Coordinate) -> Self {
        Self {
            lat_centi: (coordinate.latitude * BUCKET_SCALE).round() as i32,
            lon_centi: (coordinate.longitude * BUCKET_SCALE).round() as i32,
        }
    }
}

impl fmt::Display for LocationBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.lat_centi, self.lon_centi)
    }
}

/// Permission/availability state machine for platform geolocation.
/// Transitions are monotonic except `granted <-> requesting`; permission can
/// be re-requested after a denial, never after capability absence.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationState {
    Unknown,
    Requesting,
    Granted { coordinate: Coordinate },
    Denied,
    Unavailable,
}

impl LocationState {
    pub fn coordinate(&self) -> Option<Coordinate> {
        match self {
            LocationState::Granted { coordinate } => Some(*coordinate),
            _ => None,
        }
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, LocationState::Granted { .. })
    }

    pub fn status_text(&self) -> &'static str {
        match self {
            LocationState::Unknown => "Location permission not requested",
            LocationState::Requesting => "Requesting location permission...",
            LocationState::Granted { .. } => "Location access granted",
            LocationState::Denied => "Location access denied",
            LocationState::Unavailable => "Location services unavailable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_range_is_validated() {
        assert!(Coordinate::new(91.0, 0.0).is_err());
        assert!(Coordinate::new(0.0, -181.0).is_err());
        assert!(Coordinate::new(35.68, 139.69).is_ok());
    }

    #[test]
    fn gps_jitter_stays_in_one_bucket() {
        let a = Coordinate::new(35.6812, 139.7671).unwrap();
        let b = Coordinate::new(35.6809, 139.7668).unwrap();
        assert_eq!(
            LocationBucket::from_coordinate(a),
            LocationBucket::from_coordinate(b)
        );
    }

    #[test]
    fn a_real_move_changes_the_bucket() {
        let home = Coordinate::new(35.68, 139.76).unwrap();
        let office = Coordinate::new(35.70, 139.76).unwrap();
        assert_ne!(
            LocationBucket::from_coordinate(home),
            LocationBucket::from_coordinate(office)
        );
    }

    #[test]
    fn haversine_is_plausible() {
        let tokyo = Coordinate::new(35.6812, 139.7671).unwrap();
        let yokohama = Coordinate::new(35.4437, 139.6380).unwrap();
        let d = tokyo.distance_meters(&yokohama);
        assert!((25_000.0..35_000.0).contains(&d), "got {d}");
    }
}
