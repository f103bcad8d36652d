use std::collections::HashSet;

use async_trait::async_trait;

use crate::domain::value_objects::{InteractionKind, RecommendationId, UserId};
use crate::shared::Result;

/// The constituent writes of one like/unlike, committed atomically by the
/// store's batch-write primitive. A counter increment without the matching
/// like record is a correctness violation the store must prevent.
#[derive(Debug, Clone)]
pub struct LikeBatch {
    pub user_id: UserId,
    pub post_id: RecommendationId,
    /// `true` creates the like record and increments the counter,
    /// `false` deletes the record and decrements it.
    pub like: bool,
    /// Appended to the viewer's preference set on a new like only.
    pub business_type: Option<String>,
}

/// Narrow interface over the external document store (`users`, `posts`,
/// `likes` collections). Persistence internals are out of scope.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Ids of every post the viewer has liked. Fetched once per session.
    async fn liked_post_ids(&self, user_id: &UserId) -> Result<HashSet<RecommendationId>>;

    /// Atomic batched write for a like/unlike.
    async fn commit_like_batch(&self, batch: LikeBatch) -> Result<()>;

    /// Atomic increment of `posts/{id}.interactions.viewCount`.
    async fn increment_view_count(&self, post_id: &RecommendationId) -> Result<()>;

    /// Current bounded recent-interaction list, most recent first.
    async fn recent_interactions(
        &self,
        user_id: &UserId,
        kind: InteractionKind,
    ) -> Result<Vec<RecommendationId>>;

    /// Wholesale replacement of the recent-interaction list. Not atomic with
    /// the read; concurrent interactions from the same viewer can lose an
    /// entry. Known limitation inherited from the store contract.
    async fn replace_recent_interactions(
        &self,
        user_id: &UserId,
        kind: InteractionKind,
        post_ids: Vec<RecommendationId>,
    ) -> Result<()>;
}
