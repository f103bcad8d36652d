use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::application::ports::{
    DocumentStore, Geolocator, NoticeSink, RecommendationCache, RecommendationGateway,
};
use crate::application::services::feed_service::{FeedController, FeedState};
use crate::application::services::location_service::LocationManager;
use crate::application::services::mutation_service::OptimisticMutationEngine;
use crate::domain::value_objects::UserId;
use crate::infrastructure::scheduler::RefreshScheduler;
use crate::shared::{FeedConfig, Result};

/// Identity of the signed-in viewer. Passed in explicitly; the engine holds
/// no global auth state.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user_id: UserId,
}

/// One viewer's feed session: wires the controller, mutation engine,
/// location manager and scheduler over shared feed state, and drives
/// scheduled refreshes until torn down.
pub struct FeedSession {
    session: SessionContext,
    config: FeedConfig,
    controller: Arc<FeedController>,
    mutations: Arc<OptimisticMutationEngine>,
    location: Arc<LocationManager>,
    scheduler: Arc<RefreshScheduler>,
    cache: Arc<dyn RecommendationCache>,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl FeedSession {
    pub fn new(
        session: SessionContext,
        config: FeedConfig,
        gateway: Arc<dyn RecommendationGateway>,
        cache: Arc<dyn RecommendationCache>,
        store: Arc<dyn DocumentStore>,
        geolocator: Arc<dyn Geolocator>,
        notices: Arc<dyn NoticeSink>,
    ) -> Arc<Self> {
        let (scheduler, mut rx) = RefreshScheduler::new();
        let scheduler = Arc::new(scheduler);
        let location = Arc::new(LocationManager::new(geolocator, notices.clone()));
        let state = Arc::new(RwLock::new(FeedState::default()));

        let controller = Arc::new(FeedController::new(
            session.clone(),
            config.clone(),
            gateway,
            cache.clone(),
            store.clone(),
            location.clone(),
            scheduler.clone(),
            notices.clone(),
            state.clone(),
        ));
        let mutations = Arc::new(OptimisticMutationEngine::new(
            session.clone(),
            config.clone(),
            store,
            cache.clone(),
            scheduler.clone(),
            notices,
            state,
        ));

        // Scheduler firings arrive over the channel; the timers themselves
        // never hold a reference into the controller.
        let driver = {
            let controller = controller.clone();
            tokio::spawn(async move {
                while let Some(signal) = rx.recv().await {
                    debug!(?signal, "scheduled refresh firing");
                    if let Err(err) = controller.load_first_page(true).await {
                        warn!(error = %err, "scheduled refresh failed");
                    }
                }
            })
        };

        Arc::new(Self {
            session,
            config,
            controller,
            mutations,
            location,
            scheduler,
            cache,
            driver: Mutex::new(Some(driver)),
        })
    }

    /// Arms the auto-refresh timer and performs the initial load.
    pub async fn start(&self) -> Result<()> {
        self.scheduler
            .start_auto_refresh(Duration::from_millis(self.config.auto_refresh_interval_ms))
            .await;
        self.controller.load_first_page(false).await
    }

    pub fn controller(&self) -> &FeedController {
        &self.controller
    }

    pub fn mutations(&self) -> &OptimisticMutationEngine {
        &self.mutations
    }

    pub fn location(&self) -> &LocationManager {
        &self.location
    }

    /// External signal: the viewer's profile or preferences changed
    /// somewhere outside the feed.
    pub async fn invalidate_user_cache(&self) {
        self.cache.invalidate_user(&self.session.user_id).await;
    }

    /// External signal: the location context changed outside the manager.
    pub async fn invalidate_location_cache(&self) {
        self.cache.invalidate_location().await;
    }

    /// Tears the session down. Timers are disarmed, the in-flight transport
    /// is cancelled, and late results can no longer touch feed state.
    pub async fn shutdown(&self) {
        self.scheduler.shutdown().await;
        if let Some(driver) = self.driver.lock().await.take() {
            driver.abort();
        }
        debug!("feed session shut down");
    }
}
