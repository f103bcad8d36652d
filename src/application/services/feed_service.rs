use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::application::ports::{
    DocumentStore, NoticeSink, RecommendationCache, RecommendationGateway, RecommendationRequest,
    UserNotice,
};
use crate::application::services::location_service::LocationManager;
use crate::application::services::session::SessionContext;
use crate::domain::entities::{FeedPhase, FeedSnapshot, Recommendation};
use crate::domain::value_objects::{FeedCacheKey, LocationBucket, RecommendationId};
use crate::infrastructure::scheduler::{RefreshScheduler, RequestToken};
use crate::shared::{AppError, FeedConfig, Result};

/// Feed state, exclusively owned by the controller and the mutation engine.
/// UI code only ever sees snapshots.
#[derive(Debug, Default)]
pub(crate) struct FeedState {
    pub phase: FeedPhase,
    pub items: Vec<Recommendation>,
    pub page: u32,
    pub has_more: bool,
    /// Viewer like-set, fetched once per session, then maintained locally.
    pub liked: Option<HashSet<RecommendationId>>,
    /// Bucket used by the currently rendered feed epoch. Outer `None` means
    /// no load has happened yet.
    pub last_bucket: Option<Option<LocationBucket>>,
    pub last_error: Option<String>,
}

enum PageApply {
    Replace,
    Append { page: u32 },
}

/// Orchestrates location, cache, scheduler and gateway into the paginated,
/// merged, de-duplicated feed the UI renders.
pub struct FeedController {
    session: SessionContext,
    config: FeedConfig,
    gateway: Arc<dyn RecommendationGateway>,
    cache: Arc<dyn RecommendationCache>,
    store: Arc<dyn DocumentStore>,
    location: Arc<LocationManager>,
    scheduler: Arc<RefreshScheduler>,
    notices: Arc<dyn NoticeSink>,
    state: Arc<RwLock<FeedState>>,
}

impl FeedController {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        session: SessionContext,
        config: FeedConfig,
        gateway: Arc<dyn RecommendationGateway>,
        cache: Arc<dyn RecommendationCache>,
        store: Arc<dyn DocumentStore>,
        location: Arc<LocationManager>,
        scheduler: Arc<RefreshScheduler>,
        notices: Arc<dyn NoticeSink>,
        state: Arc<RwLock<FeedState>>,
    ) -> Self {
        Self {
            session,
            config,
            gateway,
            cache,
            store,
            location,
            scheduler,
            notices,
            state,
        }
    }

    pub async fn snapshot(&self) -> FeedSnapshot {
        let state = self.state.read().await;
        FeedSnapshot {
            phase: state.phase,
            items: state.items.clone(),
            page: state.page,
            has_more: state.has_more,
            last_error: state.last_error.clone(),
        }
    }

    /// Loads (or reloads) page 1. Served from cache unless `force_refresh`
    /// or the entry was invalidated. A newer call supersedes an in-flight
    /// one at the transport level.
    pub async fn load_first_page(&self, force_refresh: bool) -> Result<()> {
        let token = self.scheduler.new_request_token();
        let cancel = self.scheduler.first_page_cancellation().await;

        let coordinate = self.location.current_state().await.coordinate();
        let bucket = coordinate.map(LocationBucket::from_coordinate);

        let bucket_changed = {
            let mut state = self.state.write().await;
            let changed = matches!(&state.last_bucket, Some(previous) if *previous != bucket);
            state.last_bucket = Some(bucket);
            changed
        };
        if bucket_changed {
            debug!("location bucket changed, clearing location-scoped pages");
            self.cache.invalidate_location().await;
        }

        let key = FeedCacheKey::new(self.session.user_id.clone(), bucket, 1);

        if !force_refresh {
            if let Some(cached) = self.cache.get(&key).await {
                debug!(key = %key, "first page served from cache");
                return self
                    .apply_page(&token, cached.items, cached.returned, PageApply::Replace)
                    .await;
            }
        }

        {
            let mut state = self.state.write().await;
            state.phase = FeedPhase::Loading;
            state.last_error = None;
        }

        let request = RecommendationRequest {
            user_id: self.session.user_id.clone(),
            page: 1,
            page_size: self.config.page_size,
            force_refresh,
            coordinate,
        };

        match self.gateway.fetch_page(request, cancel).await {
            Ok(page) => {
                self.cache.put(key, page.items.clone(), page.returned).await;
                self.apply_page(&token, page.items, page.returned, PageApply::Replace)
                    .await
            }
            Err(err) => self.handle_fetch_failure(&token, err).await,
        }
    }

    /// Fetches the next page and appends it. A no-op while loading or when
    /// the last page was short.
    pub async fn load_next_page(&self) -> Result<()> {
        let (next_page, bucket) = {
            let state = self.state.read().await;
            if state.phase == FeedPhase::Loading || !state.has_more || state.page == 0 {
                return Ok(());
            }
            (state.page + 1, state.last_bucket.flatten())
        };

        let token = self.scheduler.new_request_token();
        let key = FeedCacheKey::new(self.session.user_id.clone(), bucket, next_page);

        if let Some(cached) = self.cache.get(&key).await {
            debug!(key = %key, "page served from cache");
            return self
                .apply_page(
                    &token,
                    cached.items,
                    cached.returned,
                    PageApply::Append { page: next_page },
                )
                .await;
        }

        {
            let mut state = self.state.write().await;
            state.phase = FeedPhase::Loading;
        }

        let request = RecommendationRequest {
            user_id: self.session.user_id.clone(),
            page: next_page,
            page_size: self.config.page_size,
            force_refresh: false,
            coordinate: self.location.current_state().await.coordinate(),
        };

        // Later pages are cancelled cooperatively only, never at the
        // transport.
        match self
            .gateway
            .fetch_page(request, CancellationToken::new())
            .await
        {
            Ok(page) => {
                self.cache.put(key, page.items.clone(), page.returned).await;
                self.apply_page(
                    &token,
                    page.items,
                    page.returned,
                    PageApply::Append { page: next_page },
                )
                .await
            }
            Err(err) => self.handle_fetch_failure(&token, err).await,
        }
    }

    async fn apply_page(
        &self,
        token: &RequestToken,
        items: Vec<Recommendation>,
        returned: usize,
        mode: PageApply,
    ) -> Result<()> {
        let liked = match self.ensure_liked_set().await {
            Ok(liked) => liked,
            Err(err) => return self.handle_fetch_failure(token, err).await,
        };
        let annotated: Vec<Recommendation> = items
            .into_iter()
            .map(|mut item| {
                item.is_liked_by_viewer = liked.contains(&item.id);
                item
            })
            .collect();

        let mut state = self.state.write().await;
        if !token.is_current() {
            debug!("discarding stale feed page");
            return Ok(());
        }
        match mode {
            PageApply::Replace => {
                state.items = annotated;
                state.page = 1;
            }
            PageApply::Append { page } => {
                let existing: HashSet<RecommendationId> =
                    state.items.iter().map(|item| item.id.clone()).collect();
                for item in annotated {
                    if existing.contains(&item.id) {
                        debug!(id = %item.id, "dropping duplicate recommendation");
                        continue;
                    }
                    state.items.push(item);
                }
                state.page = page;
            }
        }
        state.has_more = returned as u32 == self.config.page_size;
        state.phase = FeedPhase::Loaded;
        state.last_error = None;
        Ok(())
    }

    async fn handle_fetch_failure(&self, token: &RequestToken, err: AppError) -> Result<()> {
        if err.is_cancelled() {
            debug!("fetch superseded, result dropped");
            return Ok(());
        }
        let blocking = {
            let mut state = self.state.write().await;
            if !token.is_current() {
                return Ok(());
            }
            state.last_error = Some(err.to_string());
            let empty = state.items.is_empty();
            state.phase = if empty { FeedPhase::Error } else { FeedPhase::Loaded };
            empty
        };
        warn!(error = %err, "feed fetch failed");
        self.notices
            .publish(UserNotice::FeedLoadFailed { blocking })
            .await;
        Err(err)
    }

    async fn ensure_liked_set(&self) -> Result<HashSet<RecommendationId>> {
        {
            let state = self.state.read().await;
            if let Some(liked) = &state.liked {
                return Ok(liked.clone());
            }
        }
        let liked = self.store.liked_post_ids(&self.session.user_id).await?;
        let mut state = self.state.write().await;
        Ok(state.liked.get_or_insert(liked).clone())
    }
}
