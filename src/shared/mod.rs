pub mod config;
pub mod error;
pub mod logging;

pub use config::{ApiConfig, AppConfig, FeedConfig};
pub use error::{AppError, Result};
