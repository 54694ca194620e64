use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Category used when a forecast step carries no weather classification.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// First geocoding match for a city query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub coordinates: Coordinates,
    pub name: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub description: String,
    pub category: Option<String>,
    pub icon: Option<String>,
    /// Epoch seconds.
    pub observed_at: i64,
    pub sunrise: i64,
    pub sunset: i64,
}

impl CurrentConditions {
    /// Strictly between sunrise and sunset.
    pub fn is_day(&self) -> bool {
        self.sunrise < self.observed_at && self.observed_at < self.sunset
    }
}

/// One normalized 3-hour forecast step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub timestamp: NaiveDateTime,
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    pub rain_mm: f64,
    pub snow_mm: f64,
    pub wind_speed_mps: f64,
    pub category: String,
    pub icon: Option<String>,
    pub description: String,
}

impl ForecastEntry {
    pub fn precipitation_mm(&self) -> f64 {
        self.rain_mm + self.snow_mm
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }
}

/// Forecast rows in provider order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForecastTable {
    rows: Vec<ForecastEntry>,
}

impl ForecastTable {
    pub fn new(rows: Vec<ForecastEntry>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ForecastEntry] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ForecastEntry> {
        self.rows.iter()
    }

    pub fn earliest(&self) -> Option<NaiveDateTime> {
        self.rows.iter().map(|r| r.timestamp).min()
    }
}

impl<'a> IntoIterator for &'a ForecastTable {
    type Item = &'a ForecastEntry;
    type IntoIter = std::slice::Iter<'a, ForecastEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Title-case each whitespace separated word, e.g. "light rain" -> "Light Rain".
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conditions(observed_at: i64, sunrise: i64, sunset: i64) -> CurrentConditions {
        CurrentConditions {
            temperature_c: 20.0,
            humidity_pct: 50,
            wind_speed_mps: 1.0,
            description: "clear sky".into(),
            category: Some("Clear".into()),
            icon: Some("01d".into()),
            observed_at,
            sunrise,
            sunset,
        }
    }

    #[test]
    fn day_is_strictly_between_sunrise_and_sunset() {
        assert!(conditions(150, 100, 200).is_day());
        assert!(!conditions(100, 100, 200).is_day());
        assert!(!conditions(200, 100, 200).is_day());
        assert!(!conditions(50, 100, 200).is_day());
    }

    #[test]
    fn observation_before_sunrise_is_night() {
        assert!(!conditions(99, 100, 200).is_day());
    }

    #[test]
    fn title_case_handles_mixed_input() {
        assert_eq!(title_case("light rain"), "Light Rain");
        assert_eq!(title_case("  sAN   fRANCISCO "), "San Francisco");
        assert_eq!(title_case(""), "");
    }
}
