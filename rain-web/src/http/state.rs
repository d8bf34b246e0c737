//! Application state for the HTTP server.

use std::sync::Arc;

use rain_core::{
    Config, DEFAULT_RADAR_TILE_HOST, ForecastProvider, Location, RadarProvider,
    provider::{forecast_provider_from_config, radar_provider_from_config},
};

/// Shared application state passed to all handlers. Nothing in it changes after startup.
#[derive(Debug, Clone)]
pub struct AppState {
    pub forecast: Arc<dyn ForecastProvider>,
    pub radar: Arc<dyn RadarProvider>,
    pub home: Arc<Location>,
    pub cities: Arc<[Location]>,
    pub radar_tile_host: Arc<str>,
}

impl AppState {
    pub fn new(
        forecast: Arc<dyn ForecastProvider>,
        radar: Arc<dyn RadarProvider>,
        home: Location,
        cities: Vec<Location>,
    ) -> Self {
        Self {
            forecast,
            radar,
            home: Arc::new(home),
            cities: cities.into(),
            radar_tile_host: Arc::from(DEFAULT_RADAR_TILE_HOST),
        }
    }

    pub fn with_radar_tile_host(mut self, host: impl Into<Arc<str>>) -> Self {
        self.radar_tile_host = host.into();
        self
    }

    /// Build providers and the watched-city list from config.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let forecast = forecast_provider_from_config(config)?;
        let radar = radar_provider_from_config(config)?;

        Ok(Self::new(
            Arc::from(forecast),
            Arc::from(radar),
            config.home.clone(),
            config.cities.clone(),
        )
        .with_radar_tile_host(config.radar_tile_host.as_str()))
    }
}
