//! Error types for configuration and for a single dashboard query.

use thiserror::Error;

/// Failures that stop the dashboard from starting at all.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "API key is not set.\n\
         Hint: export API_KEY=<your OpenWeather key> or put it in a .env file."
    )]
    MissingApiKey,

    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Settings file error: {0:#}")]
    Settings(#[from] anyhow::Error),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Terminal outcomes of one city query.
///
/// Blank input is not represented here: the pipeline returns `Ok(None)` for it.
/// Malformed forecast steps never reach this type either; the normalizer
/// absorbs them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("City not found: {0}")]
    LocationNotFound(String),

    #[error("Location lookup failed: {0}")]
    LocationLookupFailed(String),

    #[error("Weather provider error: {0}")]
    ProviderError(String),

    /// A newer query started while this one was in flight.
    #[error("Query superseded by a newer one")]
    Superseded,
}

impl QueryError {
    /// Single line suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::LocationNotFound(_) => "City not found".to_string(),
            Self::LocationLookupFailed(_) => {
                "Could not look up that location. Check your connection and try again.".to_string()
            }
            Self::ProviderError(_) => "Weather API error".to_string(),
            Self::Superseded => String::new(),
        }
    }

    /// Stale results are dropped without telling the user.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::Superseded)
    }
}
