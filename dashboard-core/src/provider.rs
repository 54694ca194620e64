use crate::{
    config::Config,
    error::{ConfigError, QueryError},
    model::{Coordinates, CurrentConditions, ForecastTable, ResolvedLocation},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// Source of location and weather data for one query.
///
/// Implementations map transport and parse failures onto [`QueryError`]:
/// geocoding failures are `LocationLookupFailed`, everything after is
/// `ProviderError`.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// First match for `city`, or `None` if the provider knows no such place.
    async fn geocode(&self, city: &str) -> Result<Option<ResolvedLocation>, QueryError>;

    async fn current_conditions(&self, at: Coordinates) -> Result<CurrentConditions, QueryError>;

    async fn forecast(&self, at: Coordinates) -> Result<ForecastTable, QueryError>;
}

#[async_trait]
impl<T: WeatherProvider + ?Sized> WeatherProvider for Arc<T> {
    async fn geocode(&self, city: &str) -> Result<Option<ResolvedLocation>, QueryError> {
        (**self).geocode(city).await
    }

    async fn current_conditions(&self, at: Coordinates) -> Result<CurrentConditions, QueryError> {
        (**self).current_conditions(at).await
    }

    async fn forecast(&self, at: Coordinates) -> Result<ForecastTable, QueryError> {
        (**self).forecast(at).await
    }
}

/// Construct the provider described by `config`.
pub fn provider_from_config(config: &Config) -> Result<Box<dyn WeatherProvider>, ConfigError> {
    Ok(Box::new(OpenWeatherProvider::new(config)?))
}
