use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub feed: FeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub page_size: u32,
    pub refresh_debounce_ms: u64,
    pub auto_refresh_interval_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8000".to_string(),
                request_timeout_secs: 10,
            },
            feed: FeedConfig::default(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            refresh_debounce_ms: 5_000,           // 5 seconds
            auto_refresh_interval_ms: 600_000,    // 10 minutes
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("NEARFEED_API_BASE_URL") {
            if !v.trim().is_empty() {
                cfg.api.base_url = v.trim().to_string();
            }
        }
        if let Ok(v) = std::env::var("NEARFEED_REQUEST_TIMEOUT_SECS") {
            if let Some(value) = parse_u64(&v) {
                cfg.api.request_timeout_secs = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("NEARFEED_PAGE_SIZE") {
            if let Some(value) = parse_u64(&v) {
                cfg.feed.page_size = (value.clamp(1, 100)) as u32;
            }
        }
        if let Ok(v) = std::env::var("NEARFEED_REFRESH_DEBOUNCE_MS") {
            if let Some(value) = parse_u64(&v) {
                cfg.feed.refresh_debounce_ms = value;
            }
        }
        if let Ok(v) = std::env::var("NEARFEED_AUTO_REFRESH_INTERVAL_MS") {
            if let Some(value) = parse_u64(&v) {
                cfg.feed.auto_refresh_interval_ms = value.max(1_000);
            }
        }

        cfg
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_behavior() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.feed.page_size, 10);
        assert_eq!(cfg.feed.refresh_debounce_ms, 5_000);
        assert_eq!(cfg.feed.auto_refresh_interval_ms, 600_000);
    }

    #[test]
    fn parse_u64_rejects_garbage() {
        assert_eq!(parse_u64(" 42 "), Some(42));
        assert_eq!(parse_u64("soon"), None);
    }
}
