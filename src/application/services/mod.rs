pub mod feed_service;
pub mod location_service;
pub mod mutation_service;
pub mod session;

pub use feed_service::FeedController;
pub use location_service::LocationManager;
pub use mutation_service::OptimisticMutationEngine;
pub use session::{FeedSession, SessionContext};
