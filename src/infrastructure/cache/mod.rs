pub mod memory_feed_cache;

pub use memory_feed_cache::MemoryFeedCache;
