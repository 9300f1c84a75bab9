pub mod app_config;
pub mod candidate;
pub mod categories;
pub mod classify;
pub mod config;
pub mod error;
pub mod geo;
pub mod orchestrator;
pub mod overlay;
pub mod provider;
pub mod rank;
pub mod route;

pub use app_config::{AppConfig, Environment};
pub use candidate::{BusinessStatus, Candidate, RawCandidate};
pub use categories::{load_categories, resolve_profile, CategoriesFile, CategoryProfile};
pub use classify::{filter_with_fallback, Classifier, RejectReason, Verdict};
pub use config::{load_app_config, load_app_config_from_env, parse_origin};
pub use error::{
    ConfigError, LocationError, OrchestratorError, RouteExtractionError, RoutingProviderError,
    SearchProviderError,
};
pub use geo::{distance, Bounds, GeoPoint};
pub use orchestrator::{
    FailureKind, Orchestrator, OrchestratorConfig, OrchestratorEvent, Phase, SearchSummary,
    SelectionState, Stage, StageFailure,
};
pub use overlay::{MapSurface, MarkerRole, MarkerSpec, OverlayManager, SurfaceId};
pub use provider::{
    LocationProvider, RouteRequest, RoutingProvider, SearchProvider, SearchRequest, TravelMode,
};
pub use rank::{rank, RankedCandidate, RankedResult};
pub use route::{extract_plan, RawLeg, RawRoute, RawStep, RoutePlan, RouteStep};
