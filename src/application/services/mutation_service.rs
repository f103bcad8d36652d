use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::application::ports::{
    DocumentStore, LikeBatch, NoticeSink, RecommendationCache, UserNotice,
};
use crate::application::services::feed_service::FeedState;
use crate::application::services::session::SessionContext;
use crate::domain::entities::{LikeSnapshot, PendingMutation};
use crate::domain::value_objects::{InteractionKind, MutationKind, RecommendationId};
use crate::infrastructure::scheduler::RefreshScheduler;
use crate::shared::{AppError, FeedConfig, Result};

/// Bounded length of the per-viewer recent-interaction lists.
pub(crate) const RECENT_INTERACTIONS_LIMIT: usize = 5;

/// Applies interaction writes optimistically: feed state flips before the
/// store acknowledges, and rolls back to the exact pre-mutation snapshot on
/// failure. Remote writes for one recommendation are serialized so a rapid
/// toggle sequence cannot interleave its batches.
pub struct OptimisticMutationEngine {
    session: SessionContext,
    config: FeedConfig,
    store: Arc<dyn DocumentStore>,
    cache: Arc<dyn RecommendationCache>,
    scheduler: Arc<RefreshScheduler>,
    notices: Arc<dyn NoticeSink>,
    state: Arc<RwLock<FeedState>>,
    /// Latest in-flight mutation per recommendation. A resolving write only
    /// owns the outcome while its entry is still the latest.
    pending: Mutex<HashMap<RecommendationId, PendingMutation>>,
    write_locks: Mutex<HashMap<RecommendationId, Arc<Mutex<()>>>>,
}

impl OptimisticMutationEngine {
    pub(crate) fn new(
        session: SessionContext,
        config: FeedConfig,
        store: Arc<dyn DocumentStore>,
        cache: Arc<dyn RecommendationCache>,
        scheduler: Arc<RefreshScheduler>,
        notices: Arc<dyn NoticeSink>,
        state: Arc<RwLock<FeedState>>,
    ) -> Self {
        Self {
            session,
            config,
            store,
            cache,
            scheduler,
            notices,
            state,
            pending: Mutex::new(HashMap::new()),
            write_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Flips the viewer's like on a rendered recommendation. The local flip
    /// is visible immediately; the remote batch follows.
    pub async fn toggle_like(&self, id: &RecommendationId) -> Result<()> {
        let (now_liked, previous, business_type) = {
            let mut state = self.state.write().await;
            let item = state
                .items
                .iter_mut()
                .find(|item| &item.id == id)
                .ok_or_else(|| {
                    AppError::Validation(format!("recommendation {id} is not in the feed"))
                })?;
            let previous = LikeSnapshot {
                is_liked_by_viewer: item.is_liked_by_viewer,
                like_count: item.like_count,
            };
            let now_liked = !item.is_liked_by_viewer;
            item.is_liked_by_viewer = now_liked;
            item.like_count = if now_liked {
                item.like_count + 1
            } else {
                item.like_count.saturating_sub(1)
            };
            let business_type = item.business_type.clone();
            if let Some(liked) = state.liked.as_mut() {
                if now_liked {
                    liked.insert(id.clone());
                } else {
                    liked.remove(id);
                }
            }
            (now_liked, previous, business_type)
        };

        let kind = if now_liked {
            MutationKind::Like
        } else {
            MutationKind::Unlike
        };
        let mutation = PendingMutation::new(id.clone(), kind, previous);
        let mutation_id = mutation.id;
        self.pending.lock().await.insert(id.clone(), mutation);
        debug!(id = %id, liked = now_liked, "optimistic like applied");

        // One remote write per recommendation at a time.
        let write_lock = {
            let mut locks = self.write_locks.lock().await;
            locks.entry(id.clone()).or_default().clone()
        };
        let _write_guard = write_lock.lock().await;

        let batch = LikeBatch {
            user_id: self.session.user_id.clone(),
            post_id: id.clone(),
            like: now_liked,
            // Preferences only grow on a new like, never shrink on unlike.
            business_type: if now_liked { business_type } else { None },
        };
        let result = self.store.commit_like_batch(batch).await;

        let relevant = {
            let mut pending = self.pending.lock().await;
            match pending.get(id) {
                Some(current) if current.id == mutation_id => {
                    pending.remove(id);
                    true
                }
                _ => false,
            }
        };

        match result {
            Ok(()) => {
                if relevant {
                    if now_liked {
                        self.push_recent_interaction(InteractionKind::Like, id).await;
                    }
                    self.cache.invalidate_user(&self.session.user_id).await;
                    self.scheduler
                        .schedule_debounced_refresh(Duration::from_millis(
                            self.config.refresh_debounce_ms,
                        ))
                        .await;
                }
                Ok(())
            }
            Err(err) => {
                if relevant {
                    self.rollback(id, previous).await;
                    warn!(error = %err, id = %id, "like write failed, rolled back");
                    self.notices
                        .publish(UserNotice::LikeFailed {
                            recommendation_id: id.clone(),
                        })
                        .await;
                    Err(err)
                } else {
                    // A newer toggle owns this item now; its own resolution
                    // will settle the state.
                    warn!(error = %err, id = %id, "superseded like write failed");
                    Ok(())
                }
            }
        }
    }

    /// Fire-and-forget view tracking. Failures are logged and absorbed; a
    /// view is never rolled back and never blocks the feed.
    pub async fn record_view(&self, id: &RecommendationId) {
        if let Err(err) = self.store.increment_view_count(id).await {
            warn!(error = %err, id = %id, "view counter increment failed");
            return;
        }
        self.push_recent_interaction(InteractionKind::View, id).await;
    }

    async fn rollback(&self, id: &RecommendationId, previous: LikeSnapshot) {
        let mut state = self.state.write().await;
        if let Some(item) = state.items.iter_mut().find(|item| &item.id == id) {
            item.is_liked_by_viewer = previous.is_liked_by_viewer;
            item.like_count = previous.like_count;
        }
        if let Some(liked) = state.liked.as_mut() {
            if previous.is_liked_by_viewer {
                liked.insert(id.clone());
            } else {
                liked.remove(id);
            }
        }
    }

    /// Prepends the id to the bounded recent-interaction list. Read and
    /// replace are two store calls; a concurrent interaction can lose an
    /// entry, which is acceptable for ranking hints.
    async fn push_recent_interaction(&self, kind: InteractionKind, id: &RecommendationId) {
        let current = match self
            .store
            .recent_interactions(&self.session.user_id, kind)
            .await
        {
            Ok(list) => list,
            Err(err) => {
                warn!(error = %err, "failed to read recent interactions");
                return;
            }
        };
        let mut next = Vec::with_capacity(RECENT_INTERACTIONS_LIMIT);
        next.push(id.clone());
        next.extend(current.into_iter().take(RECENT_INTERACTIONS_LIMIT - 1));
        if let Err(err) = self
            .store
            .replace_recent_interactions(&self.session.user_id, kind, next)
            .await
        {
            warn!(error = %err, "failed to update recent interactions");
        }
    }
}
