pub mod feed;
pub mod pending_mutation;
pub mod recommendation;

pub use feed::{FeedPhase, FeedSnapshot};
pub use pending_mutation::{LikeSnapshot, PendingMutation};
pub use recommendation::{AuthorSummary, Ranking, Recommendation};
