pub mod cache_key;
pub mod ids;
pub mod interaction;
pub mod location;

pub use cache_key::FeedCacheKey;
pub use ids::{RecommendationId, UserId};
pub use interaction::{InteractionKind, MutationKind};
pub use location::{Coordinate, LocationBucket, LocationState};
