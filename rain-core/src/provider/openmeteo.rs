use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::model::{CurrentReading, DailyRain, Location};

use super::{ForecastProvider, http_client, truncate_body};

const DAILY_FIELDS: &str = "rain_sum,precipitation_probability_max";
const CURRENT_FIELDS: &str = "rain,showers,precipitation";

/// Client for the Open-Meteo forecast API (no API key required).
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    base_url: String,
    http: Client,
}

impl OpenMeteoClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: http_client(timeout)?,
        })
    }

    fn forecast_url(&self) -> String {
        format!("{}/v1/forecast", self.base_url)
    }

    async fn get_body(&self, query: &[(&str, String)], what: &str) -> Result<String> {
        let res = self
            .http
            .get(self.forecast_url())
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to send request to Open-Meteo ({what})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read Open-Meteo {what} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "Open-Meteo {} request failed with status {}: {}",
                what,
                status,
                truncate_body(&body),
            ));
        }

        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct OmDailyResponse {
    daily: OmDaily,
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    rain_sum: Vec<Option<f64>>,
    precipitation_probability_max: Vec<Option<f64>>,
}

#[derive(Debug, Default, Deserialize)]
struct OmCurrent {
    #[serde(default)]
    rain: Option<f64>,
    #[serde(default)]
    showers: Option<f64>,
    #[serde(default)]
    precipitation: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OmCurrentEntry {
    #[serde(default)]
    current: OmCurrent,
}

/// A single coordinate yields an object, several coordinates an array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OmCurrentResponse {
    Many(Vec<OmCurrentEntry>),
    One(OmCurrentEntry),
}

impl OmCurrentResponse {
    fn into_entries(self) -> Vec<OmCurrentEntry> {
        match self {
            OmCurrentResponse::Many(entries) => entries,
            OmCurrentResponse::One(entry) => vec![entry],
        }
    }
}

impl From<OmCurrent> for CurrentReading {
    fn from(c: OmCurrent) -> Self {
        CurrentReading {
            rain: c.rain.unwrap_or(0.0),
            showers: c.showers.unwrap_or(0.0),
            precipitation: c.precipitation.unwrap_or(0.0),
        }
    }
}

fn join_coords(locations: &[Location], coord: impl Fn(&Location) -> f64) -> String {
    locations.iter().map(|l| coord(l).to_string()).collect::<Vec<_>>().join(",")
}

#[async_trait]
impl ForecastProvider for OpenMeteoClient {
    async fn daily_rain(&self, location: &Location) -> Result<DailyRain> {
        let query = [
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
            ("daily", DAILY_FIELDS.to_string()),
            ("timezone", "auto".to_string()),
        ];
        let body = self.get_body(&query, "daily forecast").await?;

        let parsed: OmDailyResponse =
            serde_json::from_str(&body).context("Failed to parse Open-Meteo daily forecast JSON")?;

        let rain_sum = parsed
            .daily
            .rain_sum
            .first()
            .copied()
            .flatten()
            .ok_or_else(|| anyhow!("Open-Meteo daily forecast contained no rain_sum for today"))?;

        let probability = parsed
            .daily
            .precipitation_probability_max
            .first()
            .copied()
            .flatten()
            .ok_or_else(|| {
                anyhow!("Open-Meteo daily forecast contained no precipitation probability for today")
            })?;

        Ok(DailyRain { rain_sum, probability: probability.round().clamp(0.0, 100.0) as u8 })
    }

    async fn current_readings(&self, locations: &[Location]) -> Result<Vec<CurrentReading>> {
        let query = [
            ("latitude", join_coords(locations, |l| l.latitude)),
            ("longitude", join_coords(locations, |l| l.longitude)),
            ("current", CURRENT_FIELDS.to_string()),
        ];
        let body = self.get_body(&query, "current conditions").await?;

        let parsed: OmCurrentResponse = serde_json::from_str(&body)
            .context("Failed to parse Open-Meteo current conditions JSON")?;

        Ok(parsed.into_entries().into_iter().map(|e| e.current.into()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tel_aviv() -> Location {
        Location::new("Tel Aviv", 32.0853, 34.7818)
    }

    fn client(server: &MockServer) -> OpenMeteoClient {
        OpenMeteoClient::new(server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn daily_rain_takes_todays_values() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "32.0853"))
            .and(query_param("longitude", "34.7818"))
            .and(query_param("daily", DAILY_FIELDS))
            .and(query_param("timezone", "auto"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "daily": {
                    "time": ["2026-10-19", "2026-10-20"],
                    "rain_sum": [1.4, 0.0],
                    "precipitation_probability_max": [65, 10]
                }
            })))
            .mount(&server)
            .await;

        let daily = client(&server).daily_rain(&tel_aviv()).await.unwrap();

        assert_eq!(daily, DailyRain { rain_sum: 1.4, probability: 65 });
    }

    #[tokio::test]
    async fn daily_rain_rejects_null_values() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "daily": { "rain_sum": [null], "precipitation_probability_max": [40] }
            })))
            .mount(&server)
            .await;

        let err = client(&server).daily_rain(&tel_aviv()).await.unwrap_err();
        assert!(err.to_string().contains("no rain_sum"));
    }

    #[tokio::test]
    async fn daily_rain_rejects_missing_keys() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "latitude": 32.0
            })))
            .mount(&server)
            .await;

        let err = client(&server).daily_rain(&tel_aviv()).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse Open-Meteo daily forecast JSON"));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"error":true,"reason":"Latitude must be in range"}"#),
            )
            .mount(&server)
            .await;

        let err = client(&server).daily_rain(&tel_aviv()).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("400"));
        assert!(msg.contains("Latitude must be in range"));
    }

    #[tokio::test]
    async fn current_readings_sends_comma_joined_coordinates() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "51.5074,48.8566"))
            .and(query_param("longitude", "-0.1278,2.3522"))
            .and(query_param("current", CURRENT_FIELDS))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "current": { "rain": 0.0, "showers": 0.0, "precipitation": 0.0 } },
                { "current": { "rain": 0.6, "showers": 0.1, "precipitation": 0.7 } }
            ])))
            .mount(&server)
            .await;

        let locations = vec![
            Location::new("London", 51.5074, -0.1278),
            Location::new("Paris", 48.8566, 2.3522),
        ];
        let readings = client(&server).current_readings(&locations).await.unwrap();

        assert_eq!(readings.len(), 2);
        assert!(!readings[0].is_raining());
        assert_eq!(readings[1], CurrentReading { rain: 0.6, showers: 0.1, precipitation: 0.7 });
    }

    #[tokio::test]
    async fn current_readings_normalizes_single_object() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "latitude": 51.5,
                "current": { "showers": 0.3 }
            })))
            .mount(&server)
            .await;

        let locations = vec![Location::new("London", 51.5074, -0.1278)];
        let readings = client(&server).current_readings(&locations).await.unwrap();

        assert_eq!(readings, vec![CurrentReading { rain: 0.0, showers: 0.3, precipitation: 0.0 }]);
    }

    #[tokio::test]
    async fn current_readings_fails_on_garbage() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let locations = vec![Location::new("London", 51.5074, -0.1278)];
        assert!(client(&server).current_readings(&locations).await.is_err());
    }
}
