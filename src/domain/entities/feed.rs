use super::Recommendation;

/// Loading phase of the feed controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    Idle,
    Loading,
    Loaded,
    Error,
}

impl Default for FeedPhase {
    fn default() -> Self {
        FeedPhase::Idle
    }
}

/// Read-only view of the feed handed to the UI.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub phase: FeedPhase,
    pub items: Vec<Recommendation>,
    pub page: u32,
    pub has_more: bool,
    pub last_error: Option<String>,
}
