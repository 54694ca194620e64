use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use tracing::{debug, instrument, warn};

use crate::{
    config::Config,
    error::{ConfigError, QueryError},
    model::{Coordinates, CurrentConditions, ForecastTable, ResolvedLocation},
    normalize::normalize_forecast,
};

use super::WeatherProvider;

const GEOCODE_PATH: &str = "/geo/1.0/direct";
const CURRENT_PATH: &str = "/data/2.5/weather";
const FORECAST_PATH: &str = "/data/2.5/forecast";

#[derive(Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// GET `path` with the API key appended; returns status and raw body.
    async fn get_text(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<(StatusCode, String), reqwest::Error> {
        let url = format!("{}{}", self.base_url, path);

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        debug!(%status, bytes = body.len(), path, "OpenWeather response");

        Ok((status, body))
    }

    fn coordinate_query(at: Coordinates) -> Vec<(&'static str, String)> {
        vec![
            ("lat", at.latitude.to_string()),
            ("lon", at.longitude.to_string()),
            ("units", "metric".to_string()),
        ]
    }
}

impl fmt::Debug for OpenWeatherProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherProvider")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct OwGeoMatch {
    lat: f64,
    lon: f64,
    name: Option<String>,
    country: Option<String>,
}

impl From<OwGeoMatch> for ResolvedLocation {
    fn from(m: OwGeoMatch) -> Self {
        ResolvedLocation {
            coordinates: Coordinates {
                latitude: m.lat,
                longitude: m.lon,
            },
            name: m.name,
            country: m.country,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: Option<f64>,
    humidity: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: Option<String>,
    description: Option<String>,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    cod: Option<Value>,
    message: Option<Value>,
    dt: Option<i64>,
    main: Option<OwMain>,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: Option<OwWind>,
    sys: Option<OwSys>,
}

impl OwCurrentResponse {
    /// Success is the number 200.
    fn is_success(&self) -> bool {
        matches!(&self.cod, Some(Value::Number(n)) if n.as_i64() == Some(200))
    }

    fn into_conditions(self) -> Result<CurrentConditions, QueryError> {
        let missing =
            |field: &str| QueryError::ProviderError(format!("current conditions missing {field}"));

        let main = self.main.ok_or_else(|| missing("main"))?;
        let sys = self.sys.ok_or_else(|| missing("sys"))?;
        let weather = self.weather.into_iter().next();

        Ok(CurrentConditions {
            temperature_c: main.temp.ok_or_else(|| missing("main.temp"))?,
            humidity_pct: main
                .humidity
                .map(|h| h.clamp(0.0, 100.0).round() as u8)
                .ok_or_else(|| missing("main.humidity"))?,
            wind_speed_mps: self.wind.and_then(|w| w.speed).unwrap_or(0.0),
            description: weather
                .as_ref()
                .and_then(|w| w.description.clone())
                .unwrap_or_default(),
            category: weather.as_ref().and_then(|w| w.main.clone()),
            icon: weather.and_then(|w| w.icon),
            observed_at: self.dt.ok_or_else(|| missing("dt"))?,
            sunrise: sys.sunrise.ok_or_else(|| missing("sys.sunrise"))?,
            sunset: sys.sunset.ok_or_else(|| missing("sys.sunset"))?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    cod: Option<Value>,
    message: Option<Value>,
    #[serde(default)]
    list: Vec<Value>,
}

impl OwForecastResponse {
    /// Unlike current conditions, the forecast reports success as the string "200".
    fn is_success(&self) -> bool {
        matches!(&self.cod, Some(Value::String(s)) if s == "200")
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self), level = "debug")]
    async fn geocode(&self, city: &str) -> Result<Option<ResolvedLocation>, QueryError> {
        let (status, body) = self
            .get_text(
                GEOCODE_PATH,
                &[("q", city.to_string()), ("limit", "1".to_string())],
            )
            .await
            .map_err(|e| {
                warn!(error = %e, "Geocoding request failed");
                QueryError::LocationLookupFailed(describe_transport(&e))
            })?;

        if !status.is_success() {
            return Err(QueryError::LocationLookupFailed(format!(
                "geocoding returned status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        let matches: Vec<OwGeoMatch> = serde_json::from_str(&body).map_err(|e| {
            QueryError::LocationLookupFailed(format!(
                "unexpected geocoding response ({e}): {}",
                truncate_body(&body)
            ))
        })?;

        Ok(matches.into_iter().next().map(ResolvedLocation::from))
    }

    #[instrument(skip(self), level = "debug")]
    async fn current_conditions(&self, at: Coordinates) -> Result<CurrentConditions, QueryError> {
        let (status, body) = self
            .get_text(CURRENT_PATH, &Self::coordinate_query(at))
            .await
            .map_err(|e| {
                warn!(error = %e, "Current conditions request failed");
                QueryError::ProviderError(describe_transport(&e))
            })?;

        let parsed: OwCurrentResponse = serde_json::from_str(&body).map_err(|e| {
            QueryError::ProviderError(format!(
                "unparseable current conditions (status {status}, {e}): {}",
                truncate_body(&body)
            ))
        })?;

        if !parsed.is_success() {
            return Err(QueryError::ProviderError(format!(
                "current conditions returned cod {}: {}",
                show(&parsed.cod),
                show(&parsed.message),
            )));
        }

        parsed.into_conditions()
    }

    #[instrument(skip(self), level = "debug")]
    async fn forecast(&self, at: Coordinates) -> Result<ForecastTable, QueryError> {
        let (status, body) = self
            .get_text(FORECAST_PATH, &Self::coordinate_query(at))
            .await
            .map_err(|e| {
                warn!(error = %e, "Forecast request failed");
                QueryError::ProviderError(describe_transport(&e))
            })?;

        let parsed: OwForecastResponse = serde_json::from_str(&body).map_err(|e| {
            QueryError::ProviderError(format!(
                "unparseable forecast (status {status}, {e}): {}",
                truncate_body(&body)
            ))
        })?;

        if !parsed.is_success() {
            return Err(QueryError::ProviderError(format!(
                "forecast returned cod {}: {}",
                show(&parsed.cod),
                show(&parsed.message),
            )));
        }

        let table = normalize_forecast(&parsed.list);
        debug!(steps = parsed.list.len(), rows = table.len(), "Forecast normalized");
        Ok(table)
    }
}

fn describe_transport(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("could not connect: {err}")
    } else {
        err.to_string()
    }
}

fn show(value: &Option<Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "<none>".to_string(),
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
