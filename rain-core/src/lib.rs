//! Core library for the rain forecast web app.
//!
//! This crate defines:
//! - Configuration (home location, watched cities, upstream endpoints)
//! - Clients for the forecast and radar providers
//! - The rain decision rules and the shared domain models
//!
//! It is used by `rain-web`, but can also be reused by other binaries or services.

pub mod config;
pub mod model;
pub mod provider;
pub mod rain;

pub use config::{Config, DEFAULT_RADAR_TILE_HOST, ProviderConfig, ServerConfig};
pub use model::{CurrentReading, DailyRain, ForecastResult, Location, RadarFrame, RainingCity};
pub use provider::{ForecastProvider, ProviderId, RadarProvider};
pub use rain::{get_rain_forecast, get_raining_cities, will_rain};
