use facility_core::{RoutingProviderError, SearchProviderError};
use thiserror::Error;

/// Errors returned by the place/route gateway client.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {url}")]
    RateLimited {
        url: String,
        retry_after_secs: Option<u64>,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("gateway returned no routes")]
    NoRoute,

    #[error("invalid gateway base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

impl From<ProviderError> for SearchProviderError {
    fn from(err: ProviderError) -> Self {
        SearchProviderError::new(err.to_string())
    }
}

impl From<ProviderError> for RoutingProviderError {
    fn from(err: ProviderError) -> Self {
        RoutingProviderError::new(err.to_string())
    }
}
