use crate::{
    Config,
    model::{CurrentReading, DailyRain, Location, RadarFrame},
    provider::{openmeteo::OpenMeteoClient, rainviewer::RainViewerClient},
};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use std::{fmt::Debug, time::Duration};

pub mod openmeteo;
pub mod rainviewer;

const USER_AGENT: &str = concat!("rain-core/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenMeteo,
    RainViewer,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenMeteo => "openmeteo",
            ProviderId::RainViewer => "rainviewer",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenMeteo, ProviderId::RainViewer]
    }

    /// Public endpoint used when the config does not override it.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderId::OpenMeteo => "https://api.open-meteo.com",
            ProviderId::RainViewer => "https://api.rainviewer.com",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        ProviderId::all().iter().copied().find(|id| id.as_str() == lower).ok_or_else(|| {
            let supported: Vec<_> = ProviderId::all().iter().map(ProviderId::as_str).collect();
            anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: {}.",
                supported.join(", ")
            )
        })
    }
}

/// Source of daily aggregates and current readings.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    /// Today's rain sum and precipitation probability for one location.
    async fn daily_rain(&self, location: &Location) -> anyhow::Result<DailyRain>;

    /// Current readings for every location, in the same order as `locations`.
    async fn current_readings(&self, locations: &[Location])
    -> anyhow::Result<Vec<CurrentReading>>;
}

/// Source of radar frame descriptors.
#[async_trait]
pub trait RadarProvider: Send + Sync + Debug {
    /// The most recent past frame.
    async fn latest_frame(&self) -> anyhow::Result<RadarFrame>;
}

/// Construct the forecast provider from config.
pub fn forecast_provider_from_config(config: &Config) -> anyhow::Result<Box<dyn ForecastProvider>> {
    let client = OpenMeteoClient::new(
        config.provider_base_url(ProviderId::OpenMeteo),
        config.request_timeout(),
    )?;
    Ok(Box::new(client))
}

/// Construct the radar provider from config.
pub fn radar_provider_from_config(config: &Config) -> anyhow::Result<Box<dyn RadarProvider>> {
    let client = RainViewerClient::new(
        config.provider_base_url(ProviderId::RainViewer),
        config.request_timeout(),
    )?;
    Ok(Box::new(client))
}

pub(crate) fn http_client(timeout: Duration) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
