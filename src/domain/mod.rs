pub mod entities;
pub mod value_objects;

pub use entities::{FeedPhase, FeedSnapshot, Recommendation};
pub use value_objects::{Coordinate, FeedCacheKey, LocationBucket, LocationState, RecommendationId, UserId};
