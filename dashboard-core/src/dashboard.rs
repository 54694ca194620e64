//! City query pipeline: geocode, fetch, normalize, derive, theme.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, warn};

use crate::{
    config::Config,
    error::{ConfigError, QueryError},
    model::{CurrentConditions, ForecastTable, ResolvedLocation, title_case},
    provider::{WeatherProvider, provider_from_config},
    theme::{Theme, select_theme},
    views::{
        DailySummary, HourlyPoint, TemperatureGrid, WeatherTally, daily_summary, hourly_window,
        temperature_grid, weather_tally,
    },
};

/// Everything a renderer needs for one city.
#[derive(Debug, Clone, Serialize)]
pub struct ViewModel {
    /// The query as the user typed it, title-cased.
    pub city: String,
    pub location: ResolvedLocation,
    pub current: CurrentConditions,
    pub is_day: bool,
    pub theme: Theme,
    pub forecast: ForecastTable,
    pub daily: Vec<DailySummary>,
    pub hourly: Vec<HourlyPoint>,
    pub tally: WeatherTally,
    pub grid: TemperatureGrid,
}

impl ViewModel {
    /// Derive every view from freshly fetched data.
    pub fn build(
        city: &str,
        location: ResolvedLocation,
        current: CurrentConditions,
        forecast: ForecastTable,
    ) -> Self {
        let is_day = current.is_day();
        let theme = select_theme(current.category.as_deref(), is_day);

        Self {
            city: title_case(city),
            location,
            is_day,
            theme,
            daily: daily_summary(&forecast),
            hourly: hourly_window(&forecast),
            tally: weather_tally(&forecast),
            grid: temperature_grid(&forecast),
            current,
            forecast,
        }
    }
}

/// Runs city queries against one provider. The latest query always wins.
#[derive(Debug)]
pub struct Dashboard {
    provider: Box<dyn WeatherProvider>,
    generation: AtomicU64,
}

impl Dashboard {
    pub fn new(provider: impl WeatherProvider + 'static) -> Self {
        Self::with_provider(Box::new(provider))
    }

    pub fn with_provider(provider: Box<dyn WeatherProvider>) -> Self {
        Self {
            provider,
            generation: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::with_provider(provider_from_config(config)?))
    }

    /// Handle a submitted city name.
    ///
    /// Every submission, blank or not, takes a new generation, so any query
    /// still in flight returns [`QueryError::Superseded`] instead of its result.
    /// Blank input is the idle state and returns `Ok(None)` without any network
    /// traffic. Lookup and provider failures stop the query at the first error.
    pub async fn on_city_submitted(&self, city: &str) -> Result<Option<ViewModel>, QueryError> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let city = city.trim();
        if city.is_empty() {
            return Ok(None);
        }

        info!(city, ticket, "City query started");

        let result = self.run_query(city, ticket).await;

        if !self.is_latest(ticket) {
            info!(city, ticket, "Discarding stale query result");
            return Err(QueryError::Superseded);
        }

        match result {
            Ok(view) => {
                info!(
                    city,
                    rows = view.forecast.len(),
                    days = view.daily.len(),
                    "City query finished"
                );
                Ok(Some(view))
            }
            Err(err) => {
                warn!(city, error = %err, "City query failed");
                Err(err)
            }
        }
    }

    fn is_latest(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    async fn run_query(&self, city: &str, ticket: u64) -> Result<ViewModel, QueryError> {
        let location = self
            .provider
            .geocode(city)
            .await?
            .ok_or_else(|| QueryError::LocationNotFound(city.to_string()))?;

        // Superseded while geocoding.
        if !self.is_latest(ticket) {
            return Err(QueryError::Superseded);
        }

        let at = location.coordinates;
        info!(lat = at.latitude, lon = at.longitude, "Location resolved");

        let current = self.provider.current_conditions(at).await?;
        let forecast = self.provider.forecast(at).await?;

        Ok(ViewModel::build(city, location, current, forecast))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Coordinates, ForecastEntry};
    use crate::theme::AmbientEffect;
    use async_trait::async_trait;
    use chrono::{Duration, NaiveDate};
    use std::sync::{Arc, Mutex};

    /// In-memory provider that records which calls were made.
    #[derive(Debug, Default)]
    struct FakeProvider {
        location: Option<ResolvedLocation>,
        current_error: Option<QueryError>,
        category: Option<String>,
        calls: Mutex<Vec<&'static str>>,
    }

    impl FakeProvider {
        fn found() -> Self {
            Self {
                location: Some(ResolvedLocation {
                    coordinates: Coordinates {
                        latitude: 1.0,
                        longitude: 2.0,
                    },
                    name: Some("Lisbon".into()),
                    country: Some("PT".into()),
                }),
                category: Some("Clear".into()),
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().map(|c| c.clone()).unwrap_or_default()
        }

        fn record(&self, call: &'static str) {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(call);
            }
        }
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn geocode(&self, _city: &str) -> Result<Option<ResolvedLocation>, QueryError> {
            self.record("geocode");
            Ok(self.location.clone())
        }

        async fn current_conditions(
            &self,
            _at: Coordinates,
        ) -> Result<CurrentConditions, QueryError> {
            self.record("current");
            if let Some(err) = &self.current_error {
                return Err(err.clone());
            }
            Ok(CurrentConditions {
                temperature_c: 21.0,
                humidity_pct: 40,
                wind_speed_mps: 3.0,
                description: "clear sky".into(),
                category: self.category.clone(),
                icon: Some("01d".into()),
                observed_at: 150,
                sunrise: 100,
                sunset: 200,
            })
        }

        async fn forecast(&self, _at: Coordinates) -> Result<ForecastTable, QueryError> {
            self.record("forecast");
            let start = NaiveDate::from_ymd_opt(2024, 6, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .expect("valid start");
            let rows = (0..40)
                .map(|i| ForecastEntry {
                    timestamp: start + Duration::hours(3 * i),
                    temperature_c: 15.0 + i as f64 * 0.1,
                    humidity_pct: 55,
                    temp_min_c: 14.0,
                    temp_max_c: 16.0,
                    rain_mm: 0.0,
                    snow_mm: 0.0,
                    wind_speed_mps: 2.0,
                    category: "Clear".into(),
                    icon: Some("01d".into()),
                    description: "clear sky".into(),
                })
                .collect();
            Ok(ForecastTable::new(rows))
        }
    }

    #[tokio::test]
    async fn blank_input_is_idle_and_makes_no_calls() {
        let provider = Arc::new(FakeProvider::found());
        let dashboard = Dashboard::new(Arc::clone(&provider));

        for input in ["", "   ", "\t\n"] {
            assert_eq!(dashboard.on_city_submitted(input).await.map(|v| v.is_none()), Ok(true));
        }
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn full_query_builds_every_view() {
        let provider = Arc::new(FakeProvider::found());
        let dashboard = Dashboard::new(Arc::clone(&provider));

        let view = dashboard
            .on_city_submitted("  lisbon ")
            .await
            .expect("query")
            .expect("view");

        assert_eq!(view.city, "Lisbon");
        assert!(view.is_day);
        assert!(view.theme.has(AmbientEffect::Sun));
        assert_eq!(view.forecast.len(), 40);
        assert_eq!(view.daily.len(), 5);
        assert_eq!(view.hourly.len(), 8);
        assert_eq!(view.hourly[0].label, "Now");
        assert_eq!(view.tally.count("Clear"), 40);
        assert_eq!(view.grid.dates().len(), 5);
        assert_eq!(view.grid.hours().len(), 8);
        assert_eq!(provider.calls(), vec!["geocode", "current", "forecast"]);
    }

    #[tokio::test]
    async fn unknown_city_stops_before_weather_calls() {
        let provider = Arc::new(FakeProvider::default());
        let dashboard = Dashboard::new(Arc::clone(&provider));

        let err = dashboard.on_city_submitted("Atlantis").await.unwrap_err();
        assert_eq!(err, QueryError::LocationNotFound("Atlantis".into()));
        assert_eq!(provider.calls(), vec!["geocode"]);
    }

    #[tokio::test]
    async fn view_model_serializes_to_json() {
        let dashboard = Dashboard::new(FakeProvider::found());
        let view = dashboard
            .on_city_submitted("Lisbon")
            .await
            .expect("query")
            .expect("view");

        let json = serde_json::to_value(&view).expect("serialize");
        assert_eq!(json["city"], "Lisbon");
        assert_eq!(json["theme"]["effects"], serde_json::json!(["clouds", "sun"]));
        assert_eq!(json["daily"].as_array().map(Vec::len), Some(5));
        assert_eq!(json["grid"]["values"].as_array().map(Vec::len), Some(5));
    }

    #[test]
    fn view_model_night_theme() {
        let current = CurrentConditions {
            temperature_c: 3.0,
            humidity_pct: 90,
            wind_speed_mps: 0.0,
            description: "snow".into(),
            category: Some("Snow".into()),
            icon: None,
            observed_at: 500,
            sunrise: 100,
            sunset: 200,
        };
        let location = ResolvedLocation {
            coordinates: Coordinates {
                latitude: 0.0,
                longitude: 0.0,
            },
            name: None,
            country: None,
        };

        let view = ViewModel::build("oslo", location, current, ForecastTable::default());
        assert!(!view.is_day);
        assert!(view.theme.has(AmbientEffect::Snow));
        assert!(view.theme.has(AmbientEffect::Stars));
        assert!(view.daily.is_empty());
        assert!(view.hourly.is_empty());
        assert!(view.tally.is_empty());
        assert!(view.grid.is_empty());
    }

    #[tokio::test]
    async fn provider_error_halts_before_forecast() {
        let provider = FakeProvider {
            current_error: Some(QueryError::ProviderError("cod 401".into())),
            ..FakeProvider::found()
        };
        let provider = Arc::new(provider);
        let dashboard = Dashboard::new(Arc::clone(&provider));

        let err = dashboard.on_city_submitted("Lisbon").await.unwrap_err();
        assert!(matches!(err, QueryError::ProviderError(_)));
        assert_eq!(provider.calls(), vec!["geocode", "current"]);
    }
}
