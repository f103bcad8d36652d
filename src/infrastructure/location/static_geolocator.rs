use async_trait::async_trait;

use crate::application::ports::{GeolocationError, Geolocator};
use crate::domain::value_objects::Coordinate;

/// Fixed-position geolocator for headless deployments and local development,
/// where no platform prompt exists.
pub struct StaticGeolocator {
    coordinate: Option<Coordinate>,
}

impl StaticGeolocator {
    pub fn new(coordinate: Option<Coordinate>) -> Self {
        Self { coordinate }
    }
}

#[async_trait]
impl Geolocator for StaticGeolocator {
    fn is_supported(&self) -> bool {
        self.coordinate.is_some()
    }

    async fn current_position(&self) -> Result<Coordinate, GeolocationError> {
        self.coordinate.ok_or(GeolocationError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_the_configured_position() {
        let coordinate = Coordinate::new(35.68, 139.76).unwrap();
        let geolocator = StaticGeolocator::new(Some(coordinate));
        assert!(geolocator.is_supported());
        assert_eq!(geolocator.current_position().await, Ok(coordinate));
    }

    #[tokio::test]
    async fn without_a_position_the_capability_is_absent() {
        let geolocator = StaticGeolocator::new(None);
        assert!(!geolocator.is_supported());
        assert_eq!(
            geolocator.current_position().await,
            Err(GeolocationError::Unavailable)
        );
    }
}
