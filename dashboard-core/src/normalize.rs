//! Turns raw forecast steps into a [`ForecastTable`].
//!
//! Steps arrive as loosely-shaped JSON. Optional members are defaulted here so
//! nothing downstream has to care about the provider's quirks; a step that
//! cannot be placed on the time axis at all is dropped.

use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;
use tracing::debug;

use crate::model::{ForecastEntry, ForecastTable, UNKNOWN_CATEGORY};

const DT_TXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Normalize provider forecast steps, keeping provider order.
pub fn normalize_forecast(steps: &[Value]) -> ForecastTable {
    let rows = steps
        .iter()
        .enumerate()
        .filter_map(|(index, step)| {
            let entry = normalize_step(step);
            if entry.is_none() {
                debug!(index, "Dropping forecast step without timestamp or temperature");
            }
            entry
        })
        .collect();

    ForecastTable::new(rows)
}

/// Normalize a single step. `None` when it has no usable timestamp or `main.temp`.
pub fn normalize_step(step: &Value) -> Option<ForecastEntry> {
    let timestamp = step_timestamp(step)?;
    let temperature_c = number_at(step, "/main/temp")?;

    let weather = step.pointer("/weather/0");
    let category = weather
        .and_then(|w| w.get("main"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_CATEGORY)
        .to_string();
    let description = weather
        .and_then(|w| w.get("description"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let icon = weather
        .and_then(|w| w.get("icon"))
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(ForecastEntry {
        timestamp,
        temperature_c,
        humidity_pct: number_at(step, "/main/humidity").map_or(0, percent),
        temp_min_c: number_at(step, "/main/temp_min").unwrap_or(temperature_c),
        temp_max_c: number_at(step, "/main/temp_max").unwrap_or(temperature_c),
        rain_mm: three_hour_amount(step.get("rain")),
        snow_mm: three_hour_amount(step.get("snow")),
        wind_speed_mps: number_at(step, "/wind/speed").unwrap_or(0.0),
        category,
        icon,
        description,
    })
}

/// `dt_txt` as returned, falling back to `dt` epoch seconds.
fn step_timestamp(step: &Value) -> Option<NaiveDateTime> {
    let from_text = step
        .get("dt_txt")
        .and_then(Value::as_str)
        .and_then(|s| NaiveDateTime::parse_from_str(s, DT_TXT_FORMAT).ok());

    from_text.or_else(|| {
        step.get("dt")
            .and_then(Value::as_i64)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.naive_utc())
    })
}

/// `{"3h": n}` -> n; any other shape -> 0.
fn three_hour_amount(field: Option<&Value>) -> f64 {
    field
        .and_then(Value::as_object)
        .and_then(|obj| obj.get("3h"))
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

fn number_at(step: &Value, pointer: &str) -> Option<f64> {
    step.pointer(pointer).and_then(Value::as_f64)
}

fn percent(value: f64) -> u8 {
    value.clamp(0.0, 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn step(dt_txt: &str) -> Value {
        json!({
            "dt_txt": dt_txt,
            "main": {"temp": 10.0, "humidity": 70, "temp_min": 8.5, "temp_max": 11.0},
            "weather": [{"main": "Clouds", "description": "broken clouds", "icon": "04d"}],
            "wind": {"speed": 3.2}
        })
    }

    #[test]
    fn full_step_is_mapped_field_by_field() {
        let entry = normalize_step(&step("2024-03-01 12:00:00")).expect("entry");

        assert_eq!(
            entry.timestamp,
            NaiveDate::from_ymd_opt(2024, 3, 1)
                .and_then(|d| d.and_hms_opt(12, 0, 0))
                .expect("valid date")
        );
        assert_eq!(entry.temperature_c, 10.0);
        assert_eq!(entry.humidity_pct, 70);
        assert_eq!(entry.temp_min_c, 8.5);
        assert_eq!(entry.temp_max_c, 11.0);
        assert_eq!(entry.wind_speed_mps, 3.2);
        assert_eq!(entry.category, "Clouds");
        assert_eq!(entry.description, "broken clouds");
        assert_eq!(entry.icon.as_deref(), Some("04d"));
        assert_eq!(entry.precipitation_mm(), 0.0);
    }

    #[test]
    fn snow_only_step_sums_to_snow_amount() {
        let mut raw = step("2024-03-01 12:00:00");
        raw["snow"] = json!({"3h": 2.5});

        let entry = normalize_step(&raw).expect("entry");
        assert_eq!(entry.rain_mm, 0.0);
        assert_eq!(entry.snow_mm, 2.5);
        assert_eq!(entry.precipitation_mm(), 2.5);
    }

    #[test]
    fn precipitation_is_rain_plus_snow() {
        let mut raw = step("2024-03-01 12:00:00");
        raw["rain"] = json!({"3h": 1.25});
        raw["snow"] = json!({"3h": 0.5});

        let entry = normalize_step(&raw).expect("entry");
        assert_eq!(entry.precipitation_mm(), 1.75);
    }

    #[test]
    fn odd_precipitation_shapes_default_to_zero() {
        for shape in [
            json!(null),
            json!(4.0),
            json!("heavy"),
            json!([1.0]),
            json!({}),
            json!({"1h": 3.0}),
            json!({"3h": "lots"}),
        ] {
            let mut raw = step("2024-03-01 12:00:00");
            raw["rain"] = shape.clone();
            raw["snow"] = shape.clone();

            let entry = normalize_step(&raw).expect("entry");
            assert_eq!(entry.precipitation_mm(), 0.0, "shape {shape}");
        }
    }

    #[test]
    fn missing_weather_classification_is_unknown() {
        for weather in [json!([]), json!(null), json!("sunny"), json!([{"id": 800}])] {
            let mut raw = step("2024-03-01 12:00:00");
            raw["weather"] = weather;

            let entry = normalize_step(&raw).expect("entry");
            assert_eq!(entry.category, UNKNOWN_CATEGORY);
            assert_eq!(entry.description, "");
            assert_eq!(entry.icon, None);
        }
    }

    #[test]
    fn min_max_fall_back_to_temperature_and_wind_to_zero() {
        let raw = json!({
            "dt_txt": "2024-03-01 15:00:00",
            "main": {"temp": 4.0}
        });

        let entry = normalize_step(&raw).expect("entry");
        assert_eq!(entry.temp_min_c, 4.0);
        assert_eq!(entry.temp_max_c, 4.0);
        assert_eq!(entry.wind_speed_mps, 0.0);
        assert_eq!(entry.humidity_pct, 0);
    }

    #[test]
    fn epoch_used_when_text_timestamp_missing_or_bad() {
        // 2024-03-01 12:00:00 UTC
        let epoch = 1_709_294_400;
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .expect("valid date");

        let no_text = json!({"dt": epoch, "main": {"temp": 1.0}});
        assert_eq!(normalize_step(&no_text).map(|e| e.timestamp), Some(expected));

        let bad_text = json!({"dt": epoch, "dt_txt": "noon-ish", "main": {"temp": 1.0}});
        assert_eq!(normalize_step(&bad_text).map(|e| e.timestamp), Some(expected));
    }

    #[test]
    fn unplaceable_steps_are_dropped_not_fatal() {
        let steps = vec![
            step("2024-03-01 09:00:00"),
            json!({"main": {"temp": 3.0}}),
            json!({"dt_txt": "2024-03-01 12:00:00", "main": "warm"}),
            json!("garbage"),
            step("2024-03-01 15:00:00"),
        ];

        let table = normalize_forecast(&steps);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].hour(), 9);
        assert_eq!(table.rows()[1].hour(), 15);
    }

    #[test]
    fn provider_order_is_preserved() {
        let steps = vec![step("2024-03-01 15:00:00"), step("2024-03-01 09:00:00")];

        let table = normalize_forecast(&steps);
        let hours: Vec<u32> = table.iter().map(|e| e.hour()).collect();
        assert_eq!(hours, vec![15, 9]);
    }

    #[test]
    fn empty_input_gives_empty_table() {
        assert!(normalize_forecast(&[]).is_empty());
    }
}
