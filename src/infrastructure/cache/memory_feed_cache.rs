use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::application::ports::{CachedPage, RecommendationCache};
use crate::domain::entities::Recommendation;
use crate::domain::value_objects::{FeedCacheKey, UserId};

#[derive(Debug, Clone)]
struct StoredEntry {
    page: CachedPage,
    valid: bool,
}

/// In-memory feed page cache. Invalidation marks entries invalid instead of
/// removing them; `get` treats invalid entries as absent.
#[derive(Clone, Default)]
pub struct MemoryFeedCache {
    entries: Arc<RwLock<HashMap<FeedCacheKey, StoredEntry>>>,
}

impl MemoryFeedCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl RecommendationCache for MemoryFeedCache {
    async fn get(&self, key: &FeedCacheKey) -> Option<CachedPage> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.valid)
            .map(|entry| entry.page.clone())
    }

    async fn put(&self, key: FeedCacheKey, items: Vec<Recommendation>, returned: usize) {
        let entry = StoredEntry {
            page: CachedPage {
                items,
                returned,
                fetched_at: Utc::now(),
            },
            valid: true,
        };
        let mut entries = self.entries.write().await;
        entries.insert(key, entry);
    }

    async fn invalidate_user(&self, user_id: &UserId) {
        let mut entries = self.entries.write().await;
        let mut cleared = 0usize;
        for (key, entry) in entries.iter_mut() {
            if &key.user_id == user_id && entry.valid {
                entry.valid = false;
                cleared += 1;
            }
        }
        debug!(user_id = %user_id, cleared, "invalidated user feed cache");
    }

    async fn invalidate_location(&self) {
        let mut entries = self.entries.write().await;
        let mut cleared = 0usize;
        for (key, entry) in entries.iter_mut() {
            if key.bucket.is_some() && entry.valid {
                entry.valid = false;
                cleared += 1;
            }
        }
        debug!(cleared, "invalidated location-bucketed feed cache");
    }
}
