pub mod cache;
pub mod gateway;
pub mod location;
pub mod scheduler;
pub mod store;
