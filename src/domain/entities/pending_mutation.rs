use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::value_objects::{MutationKind, RecommendationId};

/// Pre-mutation values of the touched feed item. Rollback restores this
/// verbatim instead of recomputing an inverse, so rapid double-toggles
/// cannot compound an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeSnapshot {
    pub is_liked_by_viewer: bool,
    pub like_count: u64,
}

/// An in-flight optimistic change. Created when the local flip is applied,
/// destroyed on remote acknowledgement or rollback. At most one exists per
/// `(recommendation_id, kind)`; a newer one supersedes the older.
#[derive(Debug, Clone)]
pub struct PendingMutation {
    pub id: Uuid,
    pub recommendation_id: RecommendationId,
    pub kind: MutationKind,
    pub previous: LikeSnapshot,
    pub submitted_at: DateTime<Utc>,
}

impl PendingMutation {
    pub fn new(
        recommendation_id: RecommendationId,
        kind: MutationKind,
        previous: LikeSnapshot,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recommendation_id,
            kind,
            previous,
            submitted_at: Utc::now(),
        }
    }
}
