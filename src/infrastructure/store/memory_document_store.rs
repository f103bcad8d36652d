use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::{DocumentStore, LikeBatch};
use crate::domain::value_objects::{InteractionKind, RecommendationId, UserId};
use crate::shared::Result;

#[derive(Debug, Default, Clone)]
struct UserDocument {
    likes: HashSet<RecommendationId>,
    business_preferences: Vec<String>,
    last_liked_posts: Vec<RecommendationId>,
    last_viewed_posts: Vec<RecommendationId>,
}

impl UserDocument {
    fn history(&self, kind: InteractionKind) -> &Vec<RecommendationId> {
        match kind {
            InteractionKind::Like => &self.last_liked_posts,
            InteractionKind::View => &self.last_viewed_posts,
        }
    }

    fn history_mut(&mut self, kind: InteractionKind) -> &mut Vec<RecommendationId> {
        match kind {
            InteractionKind::Like => &mut self.last_liked_posts,
            InteractionKind::View => &mut self.last_viewed_posts,
        }
    }
}

#[derive(Debug, Default, Clone)]
struct PostDocument {
    likes: i64,
    view_count: i64,
}

#[derive(Debug, Default)]
struct Collections {
    users: HashMap<UserId, UserDocument>,
    posts: HashMap<RecommendationId, PostDocument>,
}

/// Reference document-store adapter. One lock spans both collections, so a
/// like batch either applies entirely or not at all, mirroring the remote
/// store's batch-write guarantee.
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    collections: Arc<RwLock<Collections>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_post(&self, post_id: RecommendationId, likes: i64) {
        let mut collections = self.collections.write().await;
        collections
            .posts
            .insert(post_id, PostDocument { likes, view_count: 0 });
    }

    pub async fn seed_like(&self, user_id: UserId, post_id: RecommendationId) {
        let mut collections = self.collections.write().await;
        collections
            .users
            .entry(user_id)
            .or_default()
            .likes
            .insert(post_id);
    }

    pub async fn post_like_count(&self, post_id: &RecommendationId) -> i64 {
        let collections = self.collections.read().await;
        collections.posts.get(post_id).map_or(0, |post| post.likes)
    }

    pub async fn post_view_count(&self, post_id: &RecommendationId) -> i64 {
        let collections = self.collections.read().await;
        collections
            .posts
            .get(post_id)
            .map_or(0, |post| post.view_count)
    }

    pub async fn business_preferences(&self, user_id: &UserId) -> Vec<String> {
        let collections = self.collections.read().await;
        collections
            .users
            .get(user_id)
            .map(|user| user.business_preferences.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn liked_post_ids(&self, user_id: &UserId) -> Result<HashSet<RecommendationId>> {
        let collections = self.collections.read().await;
        Ok(collections
            .users
            .get(user_id)
            .map(|user| user.likes.clone())
            .unwrap_or_default())
    }

    async fn commit_like_batch(&self, batch: LikeBatch) -> Result<()> {
        let mut collections = self.collections.write().await;
        let post = collections.posts.entry(batch.post_id.clone()).or_default();
        if batch.like {
            post.likes += 1;
        } else {
            post.likes -= 1;
        }

        let user = collections.users.entry(batch.user_id).or_default();
        if batch.like {
            user.likes.insert(batch.post_id);
            if let Some(business_type) = batch.business_type {
                // Add-if-absent, matching the store's idempotent set append.
                if !user.business_preferences.contains(&business_type) {
                    user.business_preferences.push(business_type);
                }
            }
        } else {
            user.likes.remove(&batch.post_id);
        }
        Ok(())
    }

    async fn increment_view_count(&self, post_id: &RecommendationId) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections
            .posts
            .entry(post_id.clone())
            .or_default()
            .view_count += 1;
        Ok(())
    }

    async fn recent_interactions(
        &self,
        user_id: &UserId,
        kind: InteractionKind,
    ) -> Result<Vec<RecommendationId>> {
        let collections = self.collections.read().await;
        Ok(collections
            .users
            .get(user_id)
            .map(|user| user.history(kind).clone())
            .unwrap_or_default())
    }

    async fn replace_recent_interactions(
        &self,
        user_id: &UserId,
        kind: InteractionKind,
        post_ids: Vec<RecommendationId>,
    ) -> Result<()> {
        let mut collections = self.collections.write().await;
        *collections
            .users
            .entry(user_id.clone())
            .or_default()
            .history_mut(kind) = post_ids;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId {
        UserId::new("viewer").unwrap()
    }

    fn post(id: &str) -> RecommendationId {
        RecommendationId::new(id).unwrap()
    }

    #[tokio::test]
    async fn like_batch_applies_record_counter_and_preference_together() {
        let store = MemoryDocumentStore::new();
        store.seed_post(post("p1"), 4).await;

        store
            .commit_like_batch(LikeBatch {
                user_id: user(),
                post_id: post("p1"),
                like: true,
                business_type: Some("bakery".into()),
            })
            .await
            .unwrap();

        assert_eq!(store.post_like_count(&post("p1")).await, 5);
        assert!(store.liked_post_ids(&user()).await.unwrap().contains(&post("p1")));
        assert_eq!(store.business_preferences(&user()).await, vec!["bakery"]);
    }

    #[tokio::test]
    async fn unlike_batch_reverses_record_and_counter() {
        let store = MemoryDocumentStore::new();
        store.seed_post(post("p1"), 4).await;
        store.seed_like(user(), post("p1")).await;

        store
            .commit_like_batch(LikeBatch {
                user_id: user(),
                post_id: post("p1"),
                like: false,
                business_type: None,
            })
            .await
            .unwrap();

        assert_eq!(store.post_like_count(&post("p1")).await, 3);
        assert!(store.liked_post_ids(&user()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn preference_append_is_idempotent() {
        let store = MemoryDocumentStore::new();
        for _ in 0..2 {
            store
                .commit_like_batch(LikeBatch {
                    user_id: user(),
                    post_id: post("p1"),
                    like: true,
                    business_type: Some("bakery".into()),
                })
                .await
                .unwrap();
        }
        assert_eq!(store.business_preferences(&user()).await, vec!["bakery"]);
    }

    #[tokio::test]
    async fn interaction_history_is_replaced_wholesale() {
        let store = MemoryDocumentStore::new();
        store
            .replace_recent_interactions(
                &user(),
                InteractionKind::View,
                vec![post("a"), post("b")],
            )
            .await
            .unwrap();
        store
            .replace_recent_interactions(&user(), InteractionKind::View, vec![post("c")])
            .await
            .unwrap();

        let history = store
            .recent_interactions(&user(), InteractionKind::View)
            .await
            .unwrap();
        assert_eq!(history, vec![post("c")]);
        // The like history is a separate list.
        assert!(store
            .recent_interactions(&user(), InteractionKind::Like)
            .await
            .unwrap()
            .is_empty());
    }
}
