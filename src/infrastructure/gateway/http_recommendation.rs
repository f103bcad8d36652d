use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::application::ports::{RecommendationGateway, RecommendationPage, RecommendationRequest};
use crate::domain::entities::{AuthorSummary, Ranking, Recommendation};
use crate::domain::value_objects::RecommendationId;
use crate::shared::{ApiConfig, AppError, Result};

/// HTTP client for the remote recommendation-ranking service.
pub struct HttpRecommendationGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRecommendationGateway {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|err| AppError::Config(err.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// A response without a `recommendations` array is a contract violation,
/// not an empty feed; deserialization fails and surfaces as InvalidResponse.
#[derive(Debug, Deserialize)]
struct FeedResponseDto {
    recommendations: Vec<RecommendationDto>,
}

#[derive(Debug, Default, Deserialize)]
struct RecommendationDto {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    recommendation_type: Option<String>,
    #[serde(default)]
    distance_km: Option<f64>,
    #[serde(default)]
    business_plan: Option<String>,
    #[serde(default, rename = "businessType")]
    business_type: Option<String>,
    #[serde(default)]
    likes: Option<i64>,
    #[serde(default)]
    author: Option<AuthorDto>,
    #[serde(default, rename = "businessName")]
    business_name: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default, rename = "profilePic")]
    profile_pic: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AuthorDto {
    #[serde(default, rename = "businessName")]
    business_name: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default, rename = "profilePic")]
    profile_pic: Option<String>,
}

fn map_item(dto: RecommendationDto) -> Result<Recommendation> {
    let id = dto
        .id
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Validation("recommendation without an id".into()))?;
    let id = RecommendationId::new(id)?;

    let ranking = match dto.recommendation_type.as_deref() {
        Some("location") => match dto.distance_km {
            Some(distance_km) if distance_km >= 0.0 => Ranking::Location { distance_km },
            _ => {
                return Err(AppError::Validation(format!(
                    "location-ranked item {id} without a distance"
                )))
            }
        },
        _ => Ranking::General,
    };

    let author = dto.author.unwrap_or_default();
    Ok(Recommendation {
        id,
        ranking,
        tier: dto.business_plan,
        business_type: dto.business_type,
        like_count: dto.likes.unwrap_or(0).max(0) as u64,
        is_liked_by_viewer: false,
        author: AuthorSummary {
            name: author.business_name.or(dto.business_name).unwrap_or_default(),
            handle: author.username.or(dto.username).unwrap_or_default(),
            avatar_url: author.profile_pic.or(dto.profile_pic),
        },
    })
}

#[async_trait]
impl RecommendationGateway for HttpRecommendationGateway {
    async fn fetch_page(
        &self,
        request: RecommendationRequest,
        cancel: CancellationToken,
    ) -> Result<RecommendationPage> {
        let url = format!("{}/feed/{}", self.base_url, request.user_id);

        let mut query: Vec<(&str, String)> = vec![
            ("page", request.page.to_string()),
            ("limit", request.page_size.to_string()),
        ];
        if let Some(coordinate) = request.coordinate {
            query.push(("latitude", coordinate.latitude.to_string()));
            query.push(("longitude", coordinate.longitude.to_string()));
        }
        if request.force_refresh {
            // Cache-buster for intermediaries on forced refreshes.
            query.push(("_t", Utc::now().timestamp_millis().to_string()));
        }

        let send = self.client.get(&url).query(&query).send();
        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(AppError::Cancelled),
            result = send => result?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Network(format!(
                "recommendation service returned {status}"
            )));
        }

        let body = tokio::select! {
            _ = cancel.cancelled() => return Err(AppError::Cancelled),
            result = response.json::<FeedResponseDto>() => result?,
        };

        let returned = body.recommendations.len();
        let items = body
            .recommendations
            .into_iter()
            .filter_map(|dto| match map_item(dto) {
                Ok(item) => Some(item),
                Err(err) => {
                    warn!(error = %err, "dropping malformed recommendation");
                    None
                }
            })
            .collect();

        Ok(RecommendationPage { items, returned })
    }
}
