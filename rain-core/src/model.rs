use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rain::will_rain;

/// A named point on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self { name: name.into(), latitude, longitude }
    }
}

/// Today's aggregates for a single coordinate, as reported by the forecast provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyRain {
    /// Total rain expected today, in mm.
    pub rain_sum: f64,
    /// Maximum precipitation probability for today, 0..=100.
    pub probability: u8,
}

/// Instantaneous precipitation readings for a single coordinate, in mm.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CurrentReading {
    pub rain: f64,
    pub showers: f64,
    pub precipitation: f64,
}

impl CurrentReading {
    pub fn is_raining(&self) -> bool {
        self.rain > 0.0 || self.showers > 0.0 || self.precipitation > 0.0
    }

    /// Amount shown next to a raining city.
    pub fn rain_amount(&self) -> f64 {
        self.precipitation.max(self.rain + self.showers)
    }
}

/// Outcome of a forecast lookup: either today's figures or the reason they are missing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ForecastResult {
    Forecast {
        rain_sum: f64,
        probability: u8,
        will_rain: bool,
    },
    Error {
        error: String,
    },
}

impl ForecastResult {
    pub fn error(message: impl Into<String>) -> Self {
        ForecastResult::Error { error: message.into() }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ForecastResult::Error { .. })
    }
}

impl From<DailyRain> for ForecastResult {
    fn from(daily: DailyRain) -> Self {
        ForecastResult::Forecast {
            rain_sum: daily.rain_sum,
            probability: daily.probability,
            will_rain: will_rain(daily.probability, daily.rain_sum),
        }
    }
}

/// A watched location where rain is currently being observed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RainingCity {
    #[serde(flatten)]
    pub location: Location,
    /// Observed rain amount, in mm.
    pub rain_amount: f64,
}

/// Descriptor of a radar image frame; `path` is used by the client to build tile URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadarFrame {
    /// Unix timestamp, seconds.
    pub time: i64,
    pub path: String,
}

impl RadarFrame {
    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.time, 0)
    }
}
