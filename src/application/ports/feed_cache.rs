use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::Recommendation;
use crate::domain::value_objects::{FeedCacheKey, UserId};

/// One cached feed page. Items are stored un-annotated (viewer like-state is
/// applied at serve time) and replaced wholesale, never patched in place.
#[derive(Debug, Clone)]
pub struct CachedPage {
    pub items: Vec<Recommendation>,
    pub returned: usize,
    pub fetched_at: DateTime<Utc>,
}

/// Keyed store of fetched feed pages. Entries never expire by time; they are
/// only cleared by the coarse invalidation operations, so a rendered list can
/// never mix two ranking epochs.
#[async_trait]
pub trait RecommendationCache: Send + Sync {
    /// Returns the entry for the exact key, absent if missing or invalidated.
    async fn get(&self, key: &FeedCacheKey) -> Option<CachedPage>;

    /// Overwrites any existing entry for the key and marks it valid.
    async fn put(&self, key: FeedCacheKey, items: Vec<Recommendation>, returned: usize);

    /// Clears every entry belonging to the user, across all buckets and pages.
    async fn invalidate_user(&self, user_id: &UserId);

    /// Clears every location-bucketed entry, across all users.
    async fn invalidate_location(&self);
}
