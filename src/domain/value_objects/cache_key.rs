use std::fmt;

use super::{LocationBucket, UserId};

/// Composite key of one cached feed page: viewer, coarse location bucket
/// (or none when the feed is not location-filtered), page number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedCacheKey {
    pub user_id: UserId,
    pub bucket: Option<LocationBucket>,
    pub page: u32,
}

impl FeedCacheKey {
    pub fn new(user_id: UserId, bucket: Option<LocationBucket>, page: u32) -> Self {
        Self {
            user_id,
            bucket,
            page,
        }
    }
}

impl fmt::Display for FeedCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.bucket {
            Some(bucket) => write!(f, "feed:{}:{}:{}", self.user_id, bucket, self.page),
            None => write!(f, "feed:{}:none:{}", self.user_id, self.page),
        }
    }
}
