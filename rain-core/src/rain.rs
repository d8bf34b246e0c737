//! Rain decision rules and the two lookups the page is built from.
//!
//! The forecast lookup reports failures to its caller as [`ForecastResult::Error`],
//! while the city scan degrades to an empty list. Neither ever returns `Err`.

use crate::model::{CurrentReading, ForecastResult, Location, RainingCity};
use crate::provider::ForecastProvider;

/// Probability (percent) above which rain is expected.
pub const PROBABILITY_THRESHOLD: u8 = 20;

/// Daily rain sum (mm) above which rain is expected.
pub const RAIN_SUM_THRESHOLD_MM: f64 = 0.5;

/// Both thresholds are strict.
pub fn will_rain(probability: u8, rain_sum: f64) -> bool {
    probability > PROBABILITY_THRESHOLD || rain_sum > RAIN_SUM_THRESHOLD_MM
}

/// Today's rain forecast for `location`.
pub async fn get_rain_forecast(
    provider: &dyn ForecastProvider,
    location: &Location,
) -> ForecastResult {
    match provider.daily_rain(location).await {
        Ok(daily) => {
            let result = ForecastResult::from(daily);
            tracing::debug!(location = %location.name, ?result, "Fetched daily forecast");
            result
        }
        Err(err) => {
            tracing::warn!(location = %location.name, "Forecast lookup failed: {err:#}");
            ForecastResult::error(format!("{err:#}"))
        }
    }
}

/// The subset of `locations` where rain is currently observed.
///
/// Upstream failures are logged and yield an empty list.
pub async fn get_raining_cities(
    provider: &dyn ForecastProvider,
    locations: &[Location],
) -> Vec<RainingCity> {
    if locations.is_empty() {
        return Vec::new();
    }

    match provider.current_readings(locations).await {
        Ok(readings) => {
            let raining = select_raining(locations, &readings);
            tracing::debug!(
                scanned = locations.len(),
                raining = raining.len(),
                "Scanned current precipitation"
            );
            raining
        }
        Err(err) => {
            tracing::warn!(cities = locations.len(), "City rain scan failed: {err:#}");
            Vec::new()
        }
    }
}

/// Pairs readings with locations by position and keeps the raining ones.
pub fn select_raining(locations: &[Location], readings: &[CurrentReading]) -> Vec<RainingCity> {
    if readings.len() != locations.len() {
        tracing::warn!(
            requested = locations.len(),
            received = readings.len(),
            "Provider returned a different number of readings than requested"
        );
    }

    locations
        .iter()
        .zip(readings)
        .filter(|(_, reading)| reading.is_raining())
        .map(|(location, reading)| RainingCity {
            location: location.clone(),
            rain_amount: reading.rain_amount(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DailyRain;
    use anyhow::anyhow;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct StubProvider {
        daily: Option<DailyRain>,
        current: Option<Vec<CurrentReading>>,
    }

    #[async_trait]
    impl ForecastProvider for StubProvider {
        async fn daily_rain(&self, _location: &Location) -> anyhow::Result<DailyRain> {
            self.daily.ok_or_else(|| anyhow!("connection refused"))
        }

        async fn current_readings(
            &self,
            _locations: &[Location],
        ) -> anyhow::Result<Vec<CurrentReading>> {
            self.current.clone().ok_or_else(|| anyhow!("connection refused"))
        }
    }

    fn cities() -> Vec<Location> {
        vec![
            Location::new("London", 51.5074, -0.1278),
            Location::new("Paris", 48.8566, 2.3522),
            Location::new("Tokyo", 35.6762, 139.6503),
        ]
    }

    fn reading(rain: f64, showers: f64, precipitation: f64) -> CurrentReading {
        CurrentReading { rain, showers, precipitation }
    }

    #[test]
    fn probability_threshold_is_strict() {
        assert!(will_rain(21, 0.0));
        assert!(!will_rain(20, 0.0));
    }

    #[test]
    fn rain_sum_threshold_is_strict() {
        assert!(will_rain(0, 0.51));
        assert!(!will_rain(0, 0.5));
    }

    #[test]
    fn both_at_boundary_means_no_rain() {
        assert!(!will_rain(20, 0.5));
    }

    #[test]
    fn select_raining_matches_by_index() {
        let readings = vec![reading(0.0, 0.0, 0.0), reading(0.0, 0.4, 0.4), reading(1.0, 0.0, 0.0)];

        let raining = select_raining(&cities(), &readings);
        let names: Vec<_> = raining.iter().map(|c| c.location.name.as_str()).collect();

        assert_eq!(names, vec!["Paris", "Tokyo"]);
        assert!((raining[0].rain_amount - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn select_raining_ignores_unmatched_tail() {
        let readings = vec![reading(0.2, 0.0, 0.2)];
        let raining = select_raining(&cities(), &readings);

        assert_eq!(raining.len(), 1);
        assert_eq!(raining[0].location.name, "London");
    }

    #[tokio::test]
    async fn forecast_failure_becomes_error_variant() {
        let provider = StubProvider { daily: None, current: None };
        let result = get_rain_forecast(&provider, &cities()[0]).await;

        match result {
            ForecastResult::Error { error } => assert!(error.contains("connection refused")),
            other => panic!("expected error variant, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn forecast_applies_decision_rule() {
        let provider = StubProvider {
            daily: Some(DailyRain { rain_sum: 0.0, probability: 21 }),
            current: None,
        };
        let result = get_rain_forecast(&provider, &cities()[0]).await;

        assert_eq!(
            result,
            ForecastResult::Forecast { rain_sum: 0.0, probability: 21, will_rain: true }
        );
    }

    #[tokio::test]
    async fn city_scan_failure_is_silently_empty() {
        let provider = StubProvider { daily: None, current: None };
        let raining = get_raining_cities(&provider, &cities()).await;
        assert!(raining.is_empty());
    }

    #[tokio::test]
    async fn city_scan_with_no_locations_is_empty() {
        let provider = StubProvider { daily: None, current: Some(vec![reading(1.0, 1.0, 1.0)]) };
        let raining = get_raining_cities(&provider, &[]).await;
        assert!(raining.is_empty());
    }
}
