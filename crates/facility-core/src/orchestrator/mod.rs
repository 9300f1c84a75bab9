//! Resolution orchestrator: locate, search, classify, rank, and route.
//!
//! State and overlay live behind one mutex that is never held across an
//! `.await`. Every `search()` bumps the run counter and the route ticket,
//! every selection bumps the route ticket, and a provider completion is only
//! applied while its counters are still current.

mod state;


use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

pub use state::{
    FailureKind, OrchestratorEvent, Phase, SearchSummary, SelectionState, Stage, StageFailure,
};

use crate::app_config::AppConfig;
use crate::candidate::Candidate;
use crate::categories::{resolve_profile, CategoriesFile, CategoryProfile};
use crate::classify::{filter_with_fallback, Classifier};
use crate::error::OrchestratorError;
use crate::geo::GeoPoint;
use crate::overlay::{MapSurface, OverlayManager};
use crate::provider::{
    LocationProvider, RouteRequest, RoutingProvider, SearchProvider, SearchRequest, TravelMode,
};
use crate::rank::{rank, RankedCandidate};
use crate::route::extract_plan;

const EVENT_CAPACITY: usize = 64;

/// Search and routing parameters for one orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    pub category: String,
    pub radius_meters: u32,
    pub max_results: u32,
    pub travel_mode: TravelMode,
    pub profile: CategoryProfile,
}

impl OrchestratorConfig {
    /// Defaults for `category`: 5 km radius, 20 results, driving, built-in profile.
    #[must_use]
    pub fn new(category: impl Into<String>) -> Self {
        let category = category.into();
        Self {
            profile: CategoryProfile::builtin(&category),
            category,
            radius_meters: 5000,
            max_results: 20,
            travel_mode: TravelMode::Driving,
        }
    }

    /// Build from application config, resolving the category profile from
    /// `categories` (if loaded) and applying the rating-floor override.
    #[must_use]
    pub fn from_app_config(config: &AppConfig, categories: Option<&CategoriesFile>) -> Self {
        let mut profile = resolve_profile(categories, &config.category);
        if let Some(min) = config.min_rating_count {
            profile.min_rating_count = min;
        }
        Self {
            category: config.category.clone(),
            radius_meters: config.search_radius_meters,
            max_results: config.max_results,
            travel_mode: config.travel_mode,
            profile,
        }
    }
}

struct Inner<M: MapSurface> {
    selection: SelectionState,
    overlay: OverlayManager<M>,
    run: u64,
    route_ticket: u64,
}

/// Routing work prepared under the lock and executed after it is released.
struct RouteJob {
    ticket: u64,
    candidate_id: String,
    request: RouteRequest,
}

pub struct Orchestrator<L, S, R, M: MapSurface> {
    config: OrchestratorConfig,
    classifier: Classifier,
    location: L,
    search: S,
    routing: R,
    inner: Mutex<Inner<M>>,
    events: broadcast::Sender<OrchestratorEvent>,
}

impl<L, S, R, M> Orchestrator<L, S, R, M>
where
    L: LocationProvider,
    S: SearchProvider,
    R: RoutingProvider,
    M: MapSurface,
{
    #[must_use]
    pub fn new(
        config: OrchestratorConfig,
        location: L,
        search: S,
        routing: R,
        surface: Arc<M>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            classifier: Classifier::from_profile(&config.profile),
            config,
            location,
            search,
            routing,
            inner: Mutex::new(Inner {
                selection: SelectionState::default(),
                overlay: OverlayManager::new(surface),
                run: 0,
                route_ticket: 0,
            }),
            events,
        }
    }

    #[must_use]
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Receive every event published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<OrchestratorEvent> {
        self.events.subscribe()
    }

    #[must_use]
    pub fn current_state(&self) -> SelectionState {
        self.lock().selection.clone()
    }

    /// Run a full locate / search / rank / route cycle.
    ///
    /// Always accepted: any run still in flight is superseded and its late
    /// results are discarded. Failures are recorded in the state and
    /// published as events, never returned.
    pub async fn search(&self) {
        let run = {
            let mut inner = self.lock();
            inner.run += 1;
            inner.route_ticket += 1;
            inner.overlay.clear_all();
            let from = inner.selection.phase;
            inner.selection = SelectionState::default();
            self.transition(&mut inner, from, Phase::Locating);
            inner.run
        };
        tracing::info!(run, category = %self.config.category, "search started");

        let origin = match self.location.current_location().await {
            Ok(origin) => origin,
            Err(e) => {
                self.fail_run(
                    run,
                    StageFailure {
                        stage: Stage::Locating,
                        kind: FailureKind::from(&e),
                        message: e.to_string(),
                    },
                );
                return;
            }
        };

        {
            let mut inner = self.lock();
            if inner.run != run {
                tracing::debug!(run, current = inner.run, "discarding stale location result");
                return;
            }
            inner.selection.origin = Some(origin);
            inner.overlay.show_user_marker(origin);
            self.set_phase(&mut inner, Phase::Searching);
        }
        tracing::debug!(run, %origin, "location acquired");

        let request = SearchRequest {
            origin,
            category: self.config.category.clone(),
            radius_meters: self.config.radius_meters,
            max_results: self.config.max_results,
        };
        let raw = match self.search.search_nearby(&request).await {
            Ok(raw) => raw,
            Err(e) => {
                self.fail_run(
                    run,
                    StageFailure {
                        stage: Stage::Searching,
                        kind: FailureKind::Provider,
                        message: e.message,
                    },
                );
                return;
            }
        };

        let candidates = Candidate::from_raw_list(raw);
        let returned = candidates.len();
        // Classify routable candidates only; a fallback set must be rankable.
        let (located, unlocated): (Vec<Candidate>, Vec<Candidate>) =
            candidates.into_iter().partition(|c| c.location.is_some());
        let filtered = filter_with_fallback(&self.classifier, located);
        let ranked = rank(origin, filtered.candidates);
        let summary = SearchSummary {
            returned,
            accepted: filtered.accepted,
            unlocated: unlocated.len(),
            fell_back: filtered.fell_back,
        };

        let job = {
            let mut inner = self.lock();
            if inner.run != run {
                tracing::debug!(run, current = inner.run, "discarding stale search result");
                return;
            }
            inner.selection.summary = Some(summary);

            let Some(first) = ranked.first().cloned() else {
                tracing::info!(
                    run,
                    returned,
                    unlocated = summary.unlocated,
                    "no candidates found"
                );
                self.set_phase(&mut inner, Phase::Empty);
                self.publish(OrchestratorEvent::NoCandidatesFound);
                return;
            };

            tracing::info!(
                run,
                returned,
                accepted = summary.accepted,
                ranked = ranked.len(),
                fell_back = summary.fell_back,
                "candidates ranked"
            );
            let count = ranked.len();
            inner.selection.ranked = ranked;
            self.set_phase(&mut inner, Phase::Ranked);
            self.publish(OrchestratorEvent::Ranked {
                count,
                fell_back: summary.fell_back,
            });
            self.begin_routing(&mut inner, origin, first)
        };

        self.route(job).await;
    }

    /// Route to the ranked candidate `id`, superseding any routing in flight.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::InvalidSelection`] when there is no ranked
    /// list or `id` is not in it. The state is left unchanged in that case.
    pub async fn select_candidate(&self, id: &str) -> Result<(), OrchestratorError> {
        let job = {
            let mut inner = self.lock();
            let phase = inner.selection.phase;
            if !phase.allows_selection() {
                return Err(OrchestratorError::InvalidSelection {
                    id: id.to_string(),
                    reason: format!("no ranked results in phase {phase}"),
                });
            }
            let (Some(origin), Some(target)) = (
                inner.selection.origin,
                inner.selection.ranked.get(id).cloned(),
            ) else {
                return Err(OrchestratorError::InvalidSelection {
                    id: id.to_string(),
                    reason: "not in the ranked results".to_string(),
                });
            };
            self.begin_routing(&mut inner, origin, target)
        };

        self.route(job).await;
        Ok(())
    }

    fn begin_routing(
        &self,
        inner: &mut Inner<M>,
        origin: GeoPoint,
        target: RankedCandidate,
    ) -> RouteJob {
        inner.route_ticket += 1;

        let alternates = inner.selection.ranked.excluding(target.id());
        inner.overlay.clear_route();
        inner.overlay.show_alternate_markers(&alternates);
        inner.overlay.show_selected_marker(&target);

        let job = RouteJob {
            ticket: inner.route_ticket,
            candidate_id: target.id().to_string(),
            request: RouteRequest {
                origin,
                destination: target.location,
                mode: self.config.travel_mode,
            },
        };
        inner.selection.selected = Some(target);
        inner.selection.route = None;
        inner.selection.last_error = None;
        self.set_phase(inner, Phase::Routing);
        tracing::debug!(
            ticket = job.ticket,
            candidate = job.candidate_id.as_str(),
            "routing started"
        );
        job
    }

    async fn route(&self, job: RouteJob) {
        let outcome = self.routing.compute_route(&job.request).await;

        let mut inner = self.lock();
        if inner.route_ticket != job.ticket {
            tracing::debug!(
                ticket = job.ticket,
                current = inner.route_ticket,
                candidate = job.candidate_id.as_str(),
                "discarding stale route result"
            );
            return;
        }

        let plan = outcome
            .map_err(|e| StageFailure {
                stage: Stage::Routing,
                kind: FailureKind::Provider,
                message: e.message,
            })
            .and_then(|raw| {
                extract_plan(&raw).map_err(|e| StageFailure {
                    stage: Stage::Routing,
                    kind: FailureKind::from(e),
                    message: e.to_string(),
                })
            });

        match plan {
            Ok(plan) => {
                inner.overlay.draw_route(&plan.path);
                inner
                    .overlay
                    .fit_bounds(&[job.request.origin, job.request.destination]);
                tracing::info!(
                    candidate = job.candidate_id.as_str(),
                    distance = plan.distance.as_str(),
                    duration = plan.duration.as_str(),
                    "route ready"
                );
                inner.selection.route = Some(plan.clone());
                self.set_phase(&mut inner, Phase::RouteReady);
                self.publish(OrchestratorEvent::RouteReady {
                    candidate_id: job.candidate_id,
                    plan,
                });
            }
            Err(failure) => {
                tracing::warn!(
                    candidate = job.candidate_id.as_str(),
                    error = %failure,
                    "routing failed"
                );
                inner.overlay.clear_route();
                inner.selection.route = None;
                inner.selection.last_error = Some(failure.clone());
                self.set_phase(&mut inner, Phase::RouteError);
                self.publish(OrchestratorEvent::Failed(failure));
            }
        }
    }

    /// End run `run` in `FatalError`, unless it has been superseded.
    fn fail_run(&self, run: u64, failure: StageFailure) {
        let mut inner = self.lock();
        if inner.run != run {
            tracing::debug!(run, current = inner.run, error = %failure, "discarding stale failure");
            return;
        }
        tracing::error!(run, error = %failure, "search failed");

        inner.route_ticket += 1;
        inner.overlay.clear_all();
        let from = inner.selection.phase;
        inner.selection = SelectionState {
            phase: Phase::FatalError,
            last_error: Some(failure.clone()),
            ..SelectionState::default()
        };
        self.publish(OrchestratorEvent::PhaseChanged {
            from,
            to: Phase::FatalError,
        });
        self.publish(OrchestratorEvent::Failed(failure));
    }

    fn set_phase(&self, inner: &mut Inner<M>, to: Phase) {
        let from = inner.selection.phase;
        self.transition(inner, from, to);
    }

    fn transition(&self, inner: &mut Inner<M>, from: Phase, to: Phase) {
        inner.selection.phase = to;
        self.publish(OrchestratorEvent::PhaseChanged { from, to });
    }

    fn publish(&self, event: OrchestratorEvent) {
        // No receivers is fine; events are advisory.
        let _ = self.events.send(event);
    }

    fn lock(&self) -> MutexGuard<'_, Inner<M>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
