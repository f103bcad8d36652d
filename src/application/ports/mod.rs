pub mod document_store;
pub mod feed_cache;
pub mod geolocator;
pub mod notices;
pub mod recommendation_gateway;

pub use document_store::{DocumentStore, LikeBatch};
pub use feed_cache::{CachedPage, RecommendationCache};
pub use geolocator::{GeolocationError, Geolocator};
pub use notices::{NoticeSink, UserNotice};
pub use recommendation_gateway::{RecommendationGateway, RecommendationPage, RecommendationRequest};
