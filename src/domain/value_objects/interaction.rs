use serde::{Deserialize, Serialize};

/// Kind of an in-flight optimistic change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    Like,
    Unlike,
    View,
}

/// Interactions recorded in the viewer's bounded recent-interaction history.
/// Unlikes are not recorded, matching the upstream ranking contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Like,
    View,
}

impl InteractionKind {
    /// Field name of the per-viewer history list in the user document.
    pub fn history_field(&self) -> &'static str {
        match self {
            InteractionKind::Like => "lastLikedPosts",
            InteractionKind::View => "lastViewedPosts",
        }
    }
}
