use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::model::RadarFrame;

use super::{RadarProvider, http_client, truncate_body};

/// Client for the RainViewer weather-maps index.
#[derive(Debug, Clone)]
pub struct RainViewerClient {
    base_url: String,
    http: Client,
}

impl RainViewerClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: http_client(timeout)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RvMaps {
    radar: RvRadar,
}

#[derive(Debug, Deserialize)]
struct RvRadar {
    #[serde(default)]
    past: Vec<RadarFrame>,
}

#[async_trait]
impl RadarProvider for RainViewerClient {
    async fn latest_frame(&self) -> Result<RadarFrame> {
        let url = format!("{}/public/weather-maps.json", self.base_url);

        let res = self
            .http
            .get(&url)
            .send()
            .await
            .context("Failed to send request to RainViewer")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read RainViewer response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "RainViewer request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let mut parsed: RvMaps =
            serde_json::from_str(&body).context("Failed to parse RainViewer weather maps JSON")?;

        let frame = parsed
            .radar
            .past
            .pop()
            .ok_or_else(|| anyhow!("RainViewer response contained no past radar frames"))?;

        tracing::debug!(time = frame.time, path = %frame.path, "Latest radar frame");
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> RainViewerClient {
        RainViewerClient::new(server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn latest_frame_is_last_past_frame() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/public/weather-maps.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "version": "2.0",
                "generated": 1760860000,
                "host": "https://tilecache.rainviewer.com",
                "radar": {
                    "past": [
                        { "time": 1760858800, "path": "/v2/radar/aaa" },
                        { "time": 1760859400, "path": "/v2/radar/bbb" },
                        { "time": 1760860000, "path": "/v2/radar/ccc" }
                    ],
                    "nowcast": [
                        { "time": 1760860600, "path": "/v2/radar/nowcast_ddd" }
                    ]
                }
            })))
            .mount(&server)
            .await;

        let frame = client(&server).latest_frame().await.unwrap();

        assert_eq!(frame, RadarFrame { time: 1760860000, path: "/v2/radar/ccc".into() });
    }

    #[tokio::test]
    async fn empty_past_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "radar": { "past": [] } })),
            )
            .mount(&server)
            .await;

        let err = client(&server).latest_frame().await.unwrap_err();
        assert!(err.to_string().contains("no past radar frames"));
    }

    #[tokio::test]
    async fn server_error_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client(&server).latest_frame().await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }
}
