use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::application::ports::{GeolocationError, Geolocator, NoticeSink, UserNotice};
use crate::domain::value_objects::{Coordinate, LocationBucket, LocationState};

/// Owns the permission/availability state machine and the last known
/// coordinate. Denial and capability absence are terminal for the session;
/// the engine surfaces the re-request action through the notice sink once
/// per failure, not on every call.
pub struct LocationManager {
    geolocator: Arc<dyn Geolocator>,
    notices: Arc<dyn NoticeSink>,
    state: RwLock<LocationState>,
    failure_notified: AtomicBool,
}

impl LocationManager {
    pub fn new(geolocator: Arc<dyn Geolocator>, notices: Arc<dyn NoticeSink>) -> Self {
        Self {
            geolocator,
            notices,
            state: RwLock::new(LocationState::Unknown),
            failure_notified: AtomicBool::new(false),
        }
    }

    /// Read-only, side-effect-free snapshot.
    pub async fn current_state(&self) -> LocationState {
        self.state.read().await.clone()
    }

    /// Bucketed coordinate when granted, for cache keying and comparison.
    pub async fn current_bucket(&self) -> Option<LocationBucket> {
        self.state
            .read()
            .await
            .coordinate()
            .map(LocationBucket::from_coordinate)
    }

    /// Triggers the platform prompt. A no-op once `unavailable`, and while a
    /// request is already in flight.
    pub async fn request_permission(&self) -> LocationState {
        {
            let mut state = self.state.write().await;
            match &*state {
                LocationState::Unavailable => return LocationState::Unavailable,
                LocationState::Requesting => return LocationState::Requesting,
                _ => {}
            }
            if !self.geolocator.is_supported() {
                *state = LocationState::Unavailable;
                drop(state);
                self.notify_failure(UserNotice::LocationUnsupported).await;
                return LocationState::Unavailable;
            }
            *state = LocationState::Requesting;
        }

        let resolved = match self.geolocator.current_position().await {
            Ok(coordinate) => LocationState::Granted { coordinate },
            Err(GeolocationError::Unavailable) => LocationState::Unavailable,
            // Timeouts count as denial; the viewer may retry explicitly.
            Err(GeolocationError::PermissionDenied) | Err(GeolocationError::Timeout) => {
                LocationState::Denied
            }
        };

        {
            let mut state = self.state.write().await;
            *state = resolved.clone();
        }

        match &resolved {
            LocationState::Granted { coordinate } => {
                debug!(
                    latitude = coordinate.latitude,
                    longitude = coordinate.longitude,
                    "location permission granted"
                );
                self.failure_notified.store(false, Ordering::SeqCst);
            }
            LocationState::Denied => {
                warn!("location permission denied");
                self.notify_failure(UserNotice::LocationPermissionDenied).await;
            }
            LocationState::Unavailable => {
                warn!("location services unavailable");
                self.notify_failure(UserNotice::LocationUnsupported).await;
            }
            _ => {}
        }

        resolved
    }

    /// Records a fresh coordinate while already granted. State identity does
    /// not change; consumers compare buckets, not raw coordinates.
    pub async fn note_position(&self, coordinate: Coordinate) {
        let mut state = self.state.write().await;
        if state.is_granted() {
            *state = LocationState::Granted { coordinate };
        }
    }

    async fn notify_failure(&self, notice: UserNotice) {
        if !self.failure_notified.swap(true, Ordering::SeqCst) {
            self.notices.publish(notice).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    struct ScriptedGeolocator {
        supported: bool,
        outcome: Mutex<Vec<Result<Coordinate, GeolocationError>>>,
    }

    impl ScriptedGeolocator {
        fn new(supported: bool, outcomes: Vec<Result<Coordinate, GeolocationError>>) -> Self {
            Self {
                supported,
                outcome: Mutex::new(outcomes),
            }
        }
    }

    #[async_trait]
    impl Geolocator for ScriptedGeolocator {
        fn is_supported(&self) -> bool {
            self.supported
        }

        async fn current_position(&self) -> Result<Coordinate, GeolocationError> {
            let mut outcomes = self.outcome.lock().await;
            outcomes.pop().unwrap_or(Err(GeolocationError::Unavailable))
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        notices: Mutex<Vec<UserNotice>>,
    }

    #[async_trait]
    impl NoticeSink for RecordingSink {
        async fn publish(&self, notice: UserNotice) {
            self.notices.lock().await.push(notice);
        }
    }

    fn coordinate() -> Coordinate {
        Coordinate::new(35.68, 139.76).unwrap()
    }

    #[tokio::test]
    async fn grant_carries_the_coordinate() {
        let geolocator = Arc::new(ScriptedGeolocator::new(true, vec![Ok(coordinate())]));
        let manager = LocationManager::new(geolocator, Arc::new(RecordingSink::default()));

        assert_eq!(manager.current_state().await, LocationState::Unknown);
        let state = manager.request_permission().await;
        assert_eq!(state.coordinate(), Some(coordinate()));
        assert!(manager.current_bucket().await.is_some());
    }

    #[tokio::test]
    async fn missing_capability_is_terminal_and_notified_once() {
        let geolocator = Arc::new(ScriptedGeolocator::new(false, vec![]));
        let sink = Arc::new(RecordingSink::default());
        let manager = LocationManager::new(geolocator, sink.clone());

        assert_eq!(
            manager.request_permission().await,
            LocationState::Unavailable
        );
        // Further requests are no-ops.
        assert_eq!(
            manager.request_permission().await,
            LocationState::Unavailable
        );
        assert_eq!(
            sink.notices.lock().await.as_slice(),
            &[UserNotice::LocationUnsupported]
        );
    }

    #[tokio::test]
    async fn denial_can_be_re_requested() {
        let geolocator = Arc::new(ScriptedGeolocator::new(
            true,
            vec![Ok(coordinate()), Err(GeolocationError::PermissionDenied)],
        ));
        let sink = Arc::new(RecordingSink::default());
        let manager = LocationManager::new(geolocator, sink.clone());

        assert_eq!(manager.request_permission().await, LocationState::Denied);
        let state = manager.request_permission().await;
        assert!(state.is_granted());
        assert_eq!(
            sink.notices.lock().await.as_slice(),
            &[UserNotice::LocationPermissionDenied]
        );
    }

    #[tokio::test]
    async fn timeout_maps_to_denied() {
        let geolocator = Arc::new(ScriptedGeolocator::new(
            true,
            vec![Err(GeolocationError::Timeout)],
        ));
        let manager =
            LocationManager::new(geolocator, Arc::new(RecordingSink::default()));
        assert_eq!(manager.request_permission().await, LocationState::Denied);
    }

    #[tokio::test]
    async fn note_position_updates_coordinate_only_when_granted() {
        let geolocator = Arc::new(ScriptedGeolocator::new(true, vec![Ok(coordinate())]));
        let manager = LocationManager::new(geolocator, Arc::new(RecordingSink::default()));

        let moved = Coordinate::new(35.70, 139.80).unwrap();
        manager.note_position(moved).await;
        assert_eq!(manager.current_state().await, LocationState::Unknown);

        manager.request_permission().await;
        manager.note_position(moved).await;
        assert_eq!(manager.current_state().await.coordinate(), Some(moved));
    }
}
