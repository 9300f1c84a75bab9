use thiserror::Error;

/// Failure to obtain the device position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("geolocation is not supported on this device")]
    Unsupported,

    #[error("timed out waiting for a position fix")]
    Timeout,

    #[error("location unavailable: {0}")]
    Unavailable(String),
}

/// Failure reported by the nearby-search provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("search provider error: {message}")]
pub struct SearchProviderError {
    pub message: String,
}

impl SearchProviderError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failure reported by the routing provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("routing provider error: {message}")]
pub struct RoutingProviderError {
    pub message: String,
}

impl RoutingProviderError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A provider route that cannot be turned into a drawable plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RouteExtractionError {
    #[error("route has no path")]
    MissingPath,

    #[error("route path is empty")]
    EmptyPath,
}

/// Errors returned synchronously by orchestrator operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestratorError {
    #[error("cannot select candidate '{id}': {reason}")]
    InvalidSelection { id: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read categories file {path}: {source}")]
    CategoriesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse categories file: {0}")]
    CategoriesFileParse(#[source] serde_yaml::Error),

    #[error("config validation failed: {0}")]
    Validation(String),
}
