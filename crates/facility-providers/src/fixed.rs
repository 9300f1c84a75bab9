use facility_core::{AppConfig, GeoPoint, LocationError, LocationProvider};

/// Location provider for hosts without a positioning device: always reports
/// the configured origin.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocationProvider {
    origin: Option<GeoPoint>,
}

impl FixedLocationProvider {
    #[must_use]
    pub fn new(origin: GeoPoint) -> Self {
        Self {
            origin: Some(origin),
        }
    }

    /// Uses `FACILITY_ORIGIN` when set; otherwise every request fails with
    /// [`LocationError::Unavailable`].
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            origin: config.origin,
        }
    }
}

impl LocationProvider for FixedLocationProvider {
    async fn current_location(&self) -> Result<GeoPoint, LocationError> {
        self.origin
            .ok_or_else(|| LocationError::Unavailable("no fixed origin configured".to_owned()))
    }
}
