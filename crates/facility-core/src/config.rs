use std::path::PathBuf;
use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::geo::GeoPoint;
use crate::provider::TravelMode;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can use a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let env = parse_environment(&or_default("FACILITY_ENV", "development"))?;
    let log_level = or_default("FACILITY_LOG_LEVEL", "info");

    let category = or_default("FACILITY_CATEGORY", "hospital").trim().to_ascii_lowercase();
    if category.is_empty() {
        return Err(invalid("FACILITY_CATEGORY", "must not be empty"));
    }

    let search_radius_meters: u32 = parse_number(
        "FACILITY_SEARCH_RADIUS_METERS",
        &or_default("FACILITY_SEARCH_RADIUS_METERS", "5000"),
    )?;
    if search_radius_meters == 0 {
        return Err(invalid("FACILITY_SEARCH_RADIUS_METERS", "must be greater than 0"));
    }

    let max_results: u32 =
        parse_number("FACILITY_MAX_RESULTS", &or_default("FACILITY_MAX_RESULTS", "20"))?;
    if max_results == 0 {
        return Err(invalid("FACILITY_MAX_RESULTS", "must be greater than 0"));
    }

    let min_rating_count = optional("FACILITY_MIN_RATING_COUNT")
        .map(|raw| parse_number::<u32>("FACILITY_MIN_RATING_COUNT", &raw))
        .transpose()?;

    let categories_path = optional("FACILITY_CATEGORIES_PATH").map(PathBuf::from);

    let travel_mode_raw = or_default("FACILITY_TRAVEL_MODE", "driving");
    let travel_mode = TravelMode::parse(&travel_mode_raw).ok_or_else(|| {
        invalid(
            "FACILITY_TRAVEL_MODE",
            &format!(
                "unknown travel mode '{travel_mode_raw}'; expected driving, walking, bicycling, or transit"
            ),
        )
    })?;

    let provider_base_url = optional("FACILITY_PROVIDER_BASE_URL");
    if let Some(url) = &provider_base_url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(invalid(
                "FACILITY_PROVIDER_BASE_URL",
                "must start with http:// or https://",
            ));
        }
    }
    let provider_api_key = optional("FACILITY_PROVIDER_API_KEY");
    if env == Environment::Production && provider_base_url.is_some() && provider_api_key.is_none()
    {
        return Err(invalid(
            "FACILITY_PROVIDER_API_KEY",
            "must be set when FACILITY_ENV=production",
        ));
    }

    let request_timeout_secs: u64 = parse_number(
        "FACILITY_REQUEST_TIMEOUT_SECS",
        &or_default("FACILITY_REQUEST_TIMEOUT_SECS", "30"),
    )?;
    let max_retries: u32 =
        parse_number("FACILITY_MAX_RETRIES", &or_default("FACILITY_MAX_RETRIES", "3"))?;
    let retry_backoff_base_ms: u64 = parse_number(
        "FACILITY_RETRY_BACKOFF_BASE_MS",
        &or_default("FACILITY_RETRY_BACKOFF_BASE_MS", "500"),
    )?;

    let origin = optional("FACILITY_ORIGIN")
        .map(|raw| parse_origin(&raw))
        .transpose()?;

    Ok(AppConfig {
        env,
        log_level,
        category,
        search_radius_meters,
        max_results,
        min_rating_count,
        categories_path,
        travel_mode,
        provider_base_url,
        provider_api_key,
        request_timeout_secs,
        max_retries,
        retry_backoff_base_ms,
        origin,
    })
}

fn invalid(var: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_number<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| invalid(var, &e.to_string()))
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "production" => Ok(Environment::Production),
        "test" => Ok(Environment::Test),
        other => Err(invalid(
            "FACILITY_ENV",
            &format!("unknown environment '{other}'; expected development, test, or production"),
        )),
    }
}

/// Parse a `"lat,lng"` pair into a validated [`GeoPoint`].
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for malformed or out-of-range coordinates.
pub fn parse_origin(raw: &str) -> Result<GeoPoint, ConfigError> {
    let (lat, lng) = raw
        .split_once(',')
        .ok_or_else(|| invalid("FACILITY_ORIGIN", "expected 'lat,lng'"))?;
    let lat: f64 = parse_number("FACILITY_ORIGIN", lat)?;
    let lng: f64 = parse_number("FACILITY_ORIGIN", lng)?;
    GeoPoint::new(lat, lng)
        .ok_or_else(|| invalid("FACILITY_ORIGIN", "coordinates out of range"))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
