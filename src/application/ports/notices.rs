use async_trait::async_trait;

use crate::domain::value_objects::RecommendationId;

/// User-visible signals. The engine emits exactly one per user-initiated
/// action; cancellations and view-recording failures never reach this port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserNotice {
    /// Feed fetch failed. Blocking only when it left the feed empty.
    FeedLoadFailed { blocking: bool },
    /// A like/unlike was rolled back after the remote write was rejected.
    LikeFailed { recommendation_id: RecommendationId },
    /// Permission was denied; the UI should offer an explicit re-request.
    LocationPermissionDenied,
    /// No geolocation capability; terminal, no re-request offered.
    LocationUnsupported,
}

#[async_trait]
pub trait NoticeSink: Send + Sync {
    async fn publish(&self, notice: UserNotice);
}
