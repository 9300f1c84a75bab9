//! HTTP client for the place/route gateway.
//!
//! Wraps `reqwest` with gateway-specific status handling and typed response
//! deserialization. Every call is a JSON `POST` retried on transient failures
//! (see [`crate::retry`]).

use std::time::Duration;

use facility_core::{
    AppConfig, RawCandidate, RawRoute, RouteRequest, RoutingProvider, RoutingProviderError,
    SearchProvider, SearchProviderError, SearchRequest,
};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::retry::retry_with_backoff;

const NEARBY_PATH: &str = "v1/places/nearby";
const ROUTES_PATH: &str = "v1/routes";
const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Deserialize)]
struct NearbyResponse {
    #[serde(default)]
    candidates: Vec<RawCandidate>,
}

#[derive(Debug, Deserialize)]
struct RoutesResponse {
    #[serde(default)]
    routes: Vec<RawRoute>,
}

/// Client for the gateway's nearby-search and routing endpoints.
///
/// Implements both [`SearchProvider`] and [`RoutingProvider`]. Cloning is
/// cheap and shares the connection pool.
#[derive(Clone)]
pub struct GatewayClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    backoff_base_ms: u64,
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("max_retries", &self.max_retries)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .finish_non_exhaustive()
    }
}

impl GatewayClient {
    /// Creates a client from application config.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidBaseUrl`] if no base URL is configured
    /// or it does not parse, and [`ProviderError::Http`] if the underlying
    /// `reqwest::Client` cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        let base_url =
            config
                .provider_base_url
                .as_deref()
                .ok_or_else(|| ProviderError::InvalidBaseUrl {
                    base_url: String::new(),
                    reason: "FACILITY_PROVIDER_BASE_URL is not set".to_owned(),
                })?;
        Self::with_base_url(
            base_url,
            config.request_timeout_secs,
            config.provider_api_key.as_deref(),
            config.max_retries,
            config.retry_backoff_base_ms,
        )
    }

    /// Creates a client against `base_url` (a wiremock server in tests).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ProviderError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        api_key: Option<&str>,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("facility-finder/0.1")
            .build()?;

        // Exactly one trailing slash so endpoint paths join under any base path.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ProviderError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.map(str::to_owned),
            max_retries,
            backoff_base_ms,
        })
    }

    /// Searches for places of `request.category` around `request.origin`.
    ///
    /// Results are returned in gateway order; ranking is the caller's job.
    ///
    /// # Errors
    ///
    /// - [`ProviderError::RateLimited`] / [`ProviderError::UnexpectedStatus`]
    ///   on non-2xx responses (after retries for 429/5xx).
    /// - [`ProviderError::Http`] on network failure after all retries.
    /// - [`ProviderError::Deserialize`] if the body does not match.
    pub async fn nearby(&self, request: &SearchRequest) -> Result<Vec<RawCandidate>, ProviderError> {
        let response: NearbyResponse = self.post_json(NEARBY_PATH, request).await?;
        tracing::debug!(
            category = request.category.as_str(),
            count = response.candidates.len(),
            "gateway nearby search complete"
        );
        Ok(response.candidates)
    }

    /// Computes a route and returns the first one the gateway offers.
    ///
    /// # Errors
    ///
    /// Same as [`Self::nearby`], plus [`ProviderError::NoRoute`] when the
    /// gateway answers with an empty route list.
    pub async fn route(&self, request: &RouteRequest) -> Result<RawRoute, ProviderError> {
        let response: RoutesResponse = self.post_json(ROUTES_PATH, request).await?;
        response
            .routes
            .into_iter()
            .next()
            .ok_or(ProviderError::NoRoute)
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, ProviderError> {
        self.base_url
            .join(path)
            .map_err(|e| ProviderError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ProviderError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;

        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let mut builder = self.client.post(url.clone()).json(body);
                if let Some(key) = &self.api_key {
                    builder = builder.header(API_KEY_HEADER, key);
                }
                let response = builder.send().await?;
                let status = response.status();

                if status == StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.trim().parse::<u64>().ok());
                    return Err(ProviderError::RateLimited {
                        url: url.to_string(),
                        retry_after_secs,
                    });
                }

                if !status.is_success() {
                    return Err(ProviderError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }

                let text = response.text().await?;
                serde_json::from_str::<T>(&text).map_err(|e| ProviderError::Deserialize {
                    context: url.to_string(),
                    source: e,
                })
            }
        })
        .await
    }
}

impl SearchProvider for GatewayClient {
    async fn search_nearby(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<RawCandidate>, SearchProviderError> {
        self.nearby(request).await.map_err(SearchProviderError::from)
    }
}

impl RoutingProvider for GatewayClient {
    async fn compute_route(&self, request: &RouteRequest) -> Result<RawRoute, RoutingProviderError> {
        self.route(request).await.map_err(RoutingProviderError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> GatewayClient {
        GatewayClient::with_base_url(base_url, 30, Some("test-key"), 0, 0)
            .expect("client construction should not fail")
    }

    #[test]
    fn endpoint_joins_under_root() {
        let client = test_client("https://gateway.example.com");
        assert_eq!(
            client.endpoint(NEARBY_PATH).unwrap().as_str(),
            "https://gateway.example.com/v1/places/nearby"
        );
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let client = test_client("https://gateway.example.com/maps/");
        assert_eq!(
            client.endpoint(ROUTES_PATH).unwrap().as_str(),
            "https://gateway.example.com/maps/v1/routes"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = GatewayClient::with_base_url("not a url", 30, None, 0, 0);
        assert!(matches!(
            result,
            Err(ProviderError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let client = test_client("https://gateway.example.com");
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("test-key"));
        assert!(rendered.contains("[redacted]"));
    }
}
