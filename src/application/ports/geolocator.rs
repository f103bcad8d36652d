use async_trait::async_trait;
use thiserror::Error;

use crate::domain::value_objects::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    Unavailable,
    #[error("position request timed out")]
    Timeout,
}

/// Platform geolocation capability. The permission prompt UI itself is an
/// external collaborator; this port only reports its outcome.
#[async_trait]
pub trait Geolocator: Send + Sync {
    /// Whether the platform has any geolocation capability at all.
    fn is_supported(&self) -> bool;

    /// Triggers the platform permission prompt if needed and resolves the
    /// current position.
    async fn current_position(&self) -> std::result::Result<Coordinate, GeolocationError>;
}
