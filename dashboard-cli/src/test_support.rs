//! Hand-built view models for renderer tests.

use chrono::{Duration, NaiveDate};
use dashboard_core::{
    Coordinates, CurrentConditions, ForecastEntry, ForecastTable, ResolvedLocation, ViewModel,
};

/// Oslo, two days of 3-hour steps from 2024-03-01 09:00, snowing.
pub fn sample_view(is_day: bool) -> ViewModel {
    let start = NaiveDate::from_ymd_opt(2024, 3, 1)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .expect("valid start");

    let rows = (0..16i64)
        .map(|i| ForecastEntry {
            timestamp: start + Duration::hours(3 * i),
            temperature_c: -3.0 + i as f64 * 0.5,
            humidity_pct: 85,
            temp_min_c: -4.0,
            temp_max_c: 1.0,
            rain_mm: 0.0,
            snow_mm: if i % 3 == 0 { 1.2 } else { 0.0 },
            wind_speed_mps: 3.4,
            category: if i % 4 == 0 { "Clouds" } else { "Snow" }.to_string(),
            icon: Some("13d".into()),
            description: "light snow".into(),
        })
        .collect();

    let current = CurrentConditions {
        temperature_c: -2.5,
        humidity_pct: 90,
        wind_speed_mps: 3.4,
        description: "light snow".into(),
        category: Some("Snow".into()),
        icon: Some("13d".into()),
        observed_at: if is_day { 150 } else { 250 },
        sunrise: 100,
        sunset: 200,
    };

    let location = ResolvedLocation {
        coordinates: Coordinates {
            latitude: 59.91,
            longitude: 10.75,
        },
        name: Some("Oslo".into()),
        country: Some("NO".into()),
    };

    ViewModel::build("oslo", location, current, ForecastTable::new(rows))
}
