use serde::{Deserialize, Serialize};

use crate::domain::value_objects::RecommendationId;

/// How the remote ranking service selected the item. Location-ranked items
/// always carry a distance; the enum makes the invariant unrepresentable
/// the other way around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Ranking {
    General,
    Location { distance_km: f64 },
}

/// Display-only author fields, opaque to the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub name: String,
    pub handle: String,
    pub avatar_url: Option<String>,
}

/// One feed item as the engine sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: RecommendationId,
    pub ranking: Ranking,
    /// Business subscription level. Derived remotely, only displayed here.
    pub tier: Option<String>,
    /// Business category appended to the viewer's preferences on a new like.
    pub business_type: Option<String>,
    pub like_count: u64,
    pub is_liked_by_viewer: bool,
    pub author: AuthorSummary,
}

impl Recommendation {
    /// Human-readable distance, present for location-ranked items only,
    /// e.g. `"3.2 km away (Premium Plan)"`.
    pub fn distance_label(&self) -> Option<String> {
        match &self.ranking {
            Ranking::Location { distance_km } => {
                let mut label = format!("{distance_km} km away");
                if let Some(tier) = self.tier.as_deref().filter(|t| !t.is_empty()) {
                    label.push_str(&format!(" ({} Plan)", capitalize(tier)));
                }
                Some(label)
            }
            Ranking::General => None,
        }
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(ranking: Ranking, tier: Option<&str>) -> Recommendation {
        Recommendation {
            id: RecommendationId::new("r1").unwrap(),
            ranking,
            tier: tier.map(str::to_string),
            business_type: None,
            like_count: 0,
            is_liked_by_viewer: false,
            author: AuthorSummary::default(),
        }
    }

    #[test]
    fn general_items_have_no_distance_label() {
        assert_eq!(item(Ranking::General, Some("premium")).distance_label(), None);
    }

    #[test]
    fn location_items_render_distance_and_tier() {
        let labeled = item(Ranking::Location { distance_km: 3.2 }, Some("premium"));
        assert_eq!(
            labeled.distance_label().as_deref(),
            Some("3.2 km away (Premium Plan)")
        );

        let bare = item(Ranking::Location { distance_km: 1.0 }, None);
        assert_eq!(bare.distance_label().as_deref(), Some("1 km away"));
    }
}
