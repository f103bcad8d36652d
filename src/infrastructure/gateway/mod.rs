pub mod http_recommendation;

pub use http_recommendation::HttpRecommendationGateway;
