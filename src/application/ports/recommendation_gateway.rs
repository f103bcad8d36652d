use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::entities::Recommendation;
use crate::domain::value_objects::{Coordinate, UserId};
use crate::shared::Result;

/// Parameters of one page fetch against the remote ranking service.
#[derive(Debug, Clone)]
pub struct RecommendationRequest {
    pub user_id: UserId,
    pub page: u32,
    pub page_size: u32,
    pub force_refresh: bool,
    pub coordinate: Option<Coordinate>,
}

/// One fetched page. `returned` is the raw item count from the service,
/// before boundary validation dropped malformed items; `has_more` inference
/// must use the raw count.
#[derive(Debug, Clone)]
pub struct RecommendationPage {
    pub items: Vec<Recommendation>,
    pub returned: usize,
}

/// The recommendation-ranking service, a black box consumed over the wire.
/// Implementations must honor the cancellation token by returning
/// `AppError::Cancelled` instead of a result.
#[async_trait]
pub trait RecommendationGateway: Send + Sync {
    async fn fetch_page(
        &self,
        request: RecommendationRequest,
        cancel: CancellationToken,
    ) -> Result<RecommendationPage>;
}
