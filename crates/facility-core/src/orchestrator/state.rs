use serde::Serialize;

use crate::error::{LocationError, RouteExtractionError};
use crate::geo::GeoPoint;
use crate::rank::{RankedCandidate, RankedResult};
use crate::route::RoutePlan;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Locating,
    Searching,
    Empty,
    Ranked,
    Routing,
    RouteReady,
    RouteError,
    FatalError,
}

impl Phase {
    /// Phases in which a ranked list exists and a candidate may be selected.
    #[must_use]
    pub fn allows_selection(self) -> bool {
        matches!(
            self,
            Phase::Ranked | Phase::Routing | Phase::RouteReady | Phase::RouteError
        )
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Locating => "locating",
            Phase::Searching => "searching",
            Phase::Empty => "empty",
            Phase::Ranked => "ranked",
            Phase::Routing => "routing",
            Phase::RouteReady => "route_ready",
            Phase::RouteError => "route_error",
            Phase::FatalError => "fatal_error",
        };
        f.write_str(name)
    }
}

/// Pipeline stage a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Locating,
    Searching,
    Routing,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Locating => write!(f, "locating"),
            Stage::Searching => write!(f, "searching"),
            Stage::Routing => write!(f, "routing"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    PermissionDenied,
    Unsupported,
    Timeout,
    LocationUnavailable,
    Provider,
    InvalidRoute,
}

impl From<&LocationError> for FailureKind {
    fn from(err: &LocationError) -> Self {
        match err {
            LocationError::PermissionDenied => FailureKind::PermissionDenied,
            LocationError::Unsupported => FailureKind::Unsupported,
            LocationError::Timeout => FailureKind::Timeout,
            LocationError::Unavailable(_) => FailureKind::LocationUnavailable,
        }
    }
}

impl From<RouteExtractionError> for FailureKind {
    fn from(_: RouteExtractionError) -> Self {
        FailureKind::InvalidRoute
    }
}

/// A provider or extraction failure, tagged with the stage it happened in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageFailure {
    pub stage: Stage,
    pub kind: FailureKind,
    pub message: String,
}

impl std::fmt::Display for StageFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.message)
    }
}

/// Counts describing what the last search produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchSummary {
    /// Records the search provider returned.
    pub returned: usize,
    /// Records the classifier accepted (0 when the fallback fired).
    pub accepted: usize,
    /// Records dropped from ranking for lack of a location.
    pub unlocated: usize,
    pub fell_back: bool,
}

/// Snapshot of everything the orchestrator knows about the current run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SelectionState {
    pub phase: Phase,
    pub origin: Option<GeoPoint>,
    pub ranked: RankedResult,
    /// Always a member of `ranked` when set.
    pub selected: Option<RankedCandidate>,
    pub route: Option<RoutePlan>,
    pub last_error: Option<StageFailure>,
    pub summary: Option<SearchSummary>,
}

impl SelectionState {
    #[must_use]
    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_ref().map(RankedCandidate::id)
    }
}

/// Notifications published on every state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum OrchestratorEvent {
    PhaseChanged { from: Phase, to: Phase },
    Ranked { count: usize, fell_back: bool },
    NoCandidatesFound,
    RouteReady { candidate_id: String, plan: RoutePlan },
    Failed(StageFailure),
}
