//! `find` and `categories` command handlers.
//!
//! `find` wires the gateway client and a fixed-origin location provider into
//! the orchestrator, runs one search, optionally re-selects a candidate, and
//! prints the outcome.

use std::fmt::Write as _;
use std::sync::Arc;

use facility_core::categories::BUILTIN_CATEGORIES;
use facility_core::{
    load_categories, AppConfig, CategoriesFile, CategoryProfile, GeoPoint, MarkerRole,
    Orchestrator, OrchestratorConfig, Phase, SelectionState, TravelMode,
};
use facility_providers::{FixedLocationProvider, GatewayClient};

use crate::surface::{markers, ConsoleSurface};

/// Command-line overrides applied on top of [`AppConfig`].
#[derive(Debug, Default)]
pub(crate) struct FindOptions {
    pub(crate) origin: Option<GeoPoint>,
    pub(crate) category: Option<String>,
    pub(crate) mode: Option<TravelMode>,
    pub(crate) select: Option<String>,
}

/// Load the category profile file, if one is configured.
fn load_profiles(config: &AppConfig) -> anyhow::Result<Option<CategoriesFile>> {
    config
        .categories_path
        .as_deref()
        .map(load_categories)
        .transpose()
        .map_err(anyhow::Error::from)
}

fn apply_overrides(config: &AppConfig, options: &FindOptions) -> AppConfig {
    let mut config = config.clone();
    if let Some(category) = &options.category {
        config.category = category.trim().to_ascii_lowercase();
    }
    if let Some(mode) = options.mode {
        config.travel_mode = mode;
    }
    if let Some(origin) = options.origin {
        config.origin = Some(origin);
    }
    config
}

/// Run one locate / search / route cycle and print the result.
///
/// # Errors
///
/// Returns an error if the categories file or gateway client cannot be
/// loaded, if the search ends in a fatal error, or if `--select` names a
/// candidate that is not in the ranked list.
pub(crate) async fn run_find(config: &AppConfig, options: FindOptions) -> anyhow::Result<()> {
    let config = apply_overrides(config, &options);
    let categories = load_profiles(&config)?;
    let orchestrator_config = OrchestratorConfig::from_app_config(&config, categories.as_ref());

    let gateway = GatewayClient::from_config(&config)
        .map_err(|e| anyhow::anyhow!("failed to build gateway client: {e}"))?;
    let location = FixedLocationProvider::from_config(&config);
    let surface = Arc::new(ConsoleSurface::default());

    tracing::info!(
        category = orchestrator_config.category.as_str(),
        radius_meters = orchestrator_config.radius_meters,
        mode = %orchestrator_config.travel_mode,
        "starting facility search"
    );
    let orchestrator = Orchestrator::new(
        orchestrator_config,
        location,
        gateway.clone(),
        gateway,
        Arc::clone(&surface),
    );

    orchestrator.search().await;
    let mut state = orchestrator.current_state();

    if let (Phase::FatalError, Some(failure)) = (state.phase, &state.last_error) {
        if let Some(id) = options.select.as_deref() {
            tracing::warn!(candidate = id, "--select not applied: search failed");
        }
        anyhow::bail!("{failure}");
    }

    if let Some(id) = options.select.as_deref() {
        if let Some(id) = pending_selection(&state, id)? {
            orchestrator.select_candidate(id).await?;
            state = orchestrator.current_state();
        }
    }

    print!("{}", render_report(&state, &config.category));
    let live = surface.live();
    tracing::debug!(
        user = markers(&live, MarkerRole::User),
        selected = markers(&live, MarkerRole::Selected),
        alternates = markers(&live, MarkerRole::Alternate),
        "final overlay"
    );
    Ok(())
}

/// The id `--select` still has to route to, or `None` when it is already
/// the selection.
///
/// # Errors
///
/// Returns an error when the run produced nothing to select from.
fn pending_selection<'a>(state: &SelectionState, id: &'a str) -> anyhow::Result<Option<&'a str>> {
    if !state.phase.allows_selection() {
        anyhow::bail!("cannot select '{id}': search ended in phase {}", state.phase);
    }
    Ok((state.selected_id() != Some(id)).then_some(id))
}

/// List the profiles the classifier would use.
///
/// # Errors
///
/// Returns an error if the configured categories file cannot be loaded.
pub(crate) fn run_categories(config: &AppConfig) -> anyhow::Result<()> {
    let profiles: Vec<CategoryProfile> = match load_profiles(config)? {
        Some(file) => file.categories,
        None => BUILTIN_CATEGORIES
            .iter()
            .map(|c| CategoryProfile::builtin(c))
            .collect(),
    };

    for profile in &profiles {
        let floor = config.min_rating_count.unwrap_or(profile.min_rating_count);
        println!(
            "{} (rating floor {}): {}",
            profile.name,
            floor,
            profile.keywords.join(", ")
        );
    }
    Ok(())
}

/// Human-readable summary of a finished run.
pub(crate) fn render_report(state: &SelectionState, category: &str) -> String {
    let mut out = String::new();

    if state.phase == Phase::Empty {
        let origin = state
            .origin
            .map_or_else(|| "your location".to_owned(), |o| o.to_string());
        let _ = writeln!(out, "No {category} found near {origin}.");
        return out;
    }

    if let Some(summary) = state.summary {
        if summary.fell_back {
            let _ = writeln!(
                out,
                "note: no result passed the {category} filters; showing unfiltered results"
            );
        }
    }

    let selected = state.selected_id();
    for (rank, entry) in state.ranked.iter().enumerate() {
        let marker = if Some(entry.id()) == selected { '*' } else { ' ' };
        let _ = writeln!(
            out,
            "{marker} {:>2}. {} ({:.1} km) [{}]",
            rank + 1,
            entry.candidate.name,
            entry.distance_meters / 1000.0,
            entry.id()
        );
        if let Some(address) = &entry.candidate.formatted_address {
            let _ = writeln!(out, "       {address}");
        }
    }

    match (&state.route, &state.last_error) {
        (Some(route), _) => {
            let _ = writeln!(out, "\nRoute: {} / {}", route.distance, route.duration);
            for (i, step) in route.steps.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "  {:>2}. {} ({}, {})",
                    i + 1,
                    step.instruction,
                    step.distance,
                    step.duration
                );
            }
        }
        (None, Some(failure)) => {
            let _ = writeln!(out, "\nRoute unavailable: {failure}");
        }
        (None, None) => {}
    }

    out
}

#[cfg(test)]
#[path = "find_test.rs"]
mod tests;
