use std::path::PathBuf;

use crate::geo::GeoPoint;
use crate::provider::TravelMode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub category: String,
    pub search_radius_meters: u32,
    pub max_results: u32,
    pub min_rating_count: Option<u32>,
    pub categories_path: Option<PathBuf>,
    pub travel_mode: TravelMode,
    pub provider_base_url: Option<String>,
    pub provider_api_key: Option<String>,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub origin: Option<GeoPoint>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("category", &self.category)
            .field("search_radius_meters", &self.search_radius_meters)
            .field("max_results", &self.max_results)
            .field("min_rating_count", &self.min_rating_count)
            .field("categories_path", &self.categories_path)
            .field("travel_mode", &self.travel_mode)
            .field("provider_base_url", &self.provider_base_url)
            .field(
                "provider_api_key",
                &self.provider_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("origin", &self.origin)
            .finish()
    }
}
