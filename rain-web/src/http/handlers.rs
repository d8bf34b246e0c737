//! HTTP handlers.

use axum::{Json, extract::State, response::Html};
use serde::{Deserialize, Serialize};

use rain_core::{RadarFrame, get_rain_forecast, get_raining_cities};

use super::error::AppError;
use super::page;
use super::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// GET /
///
/// Always answers 200: a failed forecast is rendered as an error card, a failed
/// city scan as an empty list.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let (forecast, raining) = tokio::join!(
        get_rain_forecast(state.forecast.as_ref(), &state.home),
        get_raining_cities(state.forecast.as_ref(), &state.cities),
    );

    tracing::info!(
        forecast_error = forecast.is_error(),
        raining = raining.len(),
        "Rendering index page"
    );

    Html(page::render_index(&state.home, &forecast, &raining, &state.radar_tile_host))
}

/// GET /radar-timestamp
///
/// Relays the most recent radar frame unchanged. Fetched on every call.
pub async fn radar_timestamp(State(state): State<AppState>) -> Result<Json<RadarFrame>, AppError> {
    let frame = state.radar.latest_frame().await?;
    Ok(Json(frame))
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
