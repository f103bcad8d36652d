//! Recommendation feed synchronization engine.
//!
//! Keeps a paginated, location-aware recommendation feed consistent across
//! a remote ranking service, a document store and an in-memory page cache,
//! with optimistic like/view mutations and scheduled refreshes.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use application::ports::{
    DocumentStore, Geolocator, NoticeSink, RecommendationCache, RecommendationGateway, UserNotice,
};
pub use application::services::{
    FeedController, FeedSession, LocationManager, OptimisticMutationEngine, SessionContext,
};
pub use domain::entities::{FeedPhase, FeedSnapshot, Recommendation};
pub use domain::value_objects::{Coordinate, LocationState, RecommendationId, UserId};
pub use shared::{AppConfig, AppError, Result};
