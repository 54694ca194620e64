//! Core library for the weather dashboard.
//!
//! This crate defines:
//! - Configuration (API key from the environment, optional settings file)
//! - The weather provider abstraction and its OpenWeather implementation
//! - Forecast normalization and the derived views each widget consumes
//! - Background theme selection
//! - The per-query pipeline tying it together ([`Dashboard`])
//!
//! It is used by `dashboard-cli`, but has no dependency on any renderer.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod theme;
pub mod views;

pub use config::{Config, Settings};
pub use dashboard::{Dashboard, ViewModel};
pub use error::{ConfigError, QueryError};
pub use model::{Coordinates, CurrentConditions, ForecastEntry, ForecastTable, ResolvedLocation};
pub use provider::WeatherProvider;
pub use theme::{AmbientEffect, Theme};
