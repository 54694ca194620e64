//! Aggregates built from a [`ForecastTable`] for the individual dashboard widgets.
//!
//! Every function here is pure and rebuilds its view from the table alone.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer, ser::SerializeStruct};
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::model::{ForecastEntry, ForecastTable, title_case};

pub const SUMMARY_DAYS: usize = 5;
pub const SUMMARY_HOUR: u32 = 12;
pub const NOW_LABEL: &str = "Now";

/// Midday snapshot for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    pub humidity_pct: u8,
    pub condition: String,
    pub icon: Option<String>,
    pub category: String,
}

impl DailySummary {
    fn from_entry(entry: &ForecastEntry) -> Self {
        Self {
            date: entry.date(),
            temp_min_c: entry.temp_min_c,
            temp_max_c: entry.temp_max_c,
            humidity_pct: entry.humidity_pct,
            condition: title_case(&entry.description),
            icon: entry.icon.clone(),
            category: entry.category.clone(),
        }
    }

    /// Abbreviated weekday, e.g. "Mon".
    pub fn weekday(&self) -> String {
        self.date.format("%a").to_string()
    }
}

/// One row of the rolling 24-hour view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyPoint {
    pub label: String,
    pub timestamp: NaiveDateTime,
    pub temperature_c: f64,
    pub precipitation_mm: f64,
    pub category: String,
    pub icon: Option<String>,
}

/// Row count per weather category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WeatherTally {
    counts: BTreeMap<String, usize>,
}

impl WeatherTally {
    pub fn count(&self, category: &str) -> usize {
        self.counts.get(category).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Most frequent first; ties broken by name.
    pub fn by_frequency(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }
}

/// Temperature pivoted into date rows and hour-of-day columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemperatureGrid {
    dates: Vec<NaiveDate>,
    hours: Vec<u32>,
    cells: BTreeMap<(NaiveDate, u32), f64>,
}

impl TemperatureGrid {
    /// Row keys, ascending.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Column keys, ascending.
    pub fn hours(&self) -> &[u32] {
        &self.hours
    }

    pub fn get(&self, date: NaiveDate, hour: u32) -> Option<f64> {
        self.cells.get(&(date, hour)).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn filled_cells(&self) -> usize {
        self.cells.len()
    }

    /// Dense matrix in `dates() x hours()` order; absent cells are `None`.
    pub fn matrix(&self) -> Vec<Vec<Option<f64>>> {
        self.dates
            .iter()
            .map(|date| self.hours.iter().map(|hour| self.get(*date, *hour)).collect())
            .collect()
    }
}

impl Serialize for TemperatureGrid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("TemperatureGrid", 3)?;
        state.serialize_field("dates", &self.dates)?;
        state.serialize_field("hours", &self.hours)?;
        state.serialize_field("values", &self.matrix())?;
        state.end()
    }
}

/// Noon step per date, first occurrence wins, at most [`SUMMARY_DAYS`].
pub fn daily_summary(table: &ForecastTable) -> Vec<DailySummary> {
    let mut seen = HashSet::new();

    table
        .iter()
        .filter(|entry| entry.hour() == SUMMARY_HOUR)
        .filter(|entry| seen.insert(entry.date()))
        .take(SUMMARY_DAYS)
        .map(DailySummary::from_entry)
        .collect()
}

/// Rows less than 24 hours after the earliest timestamp, in table order.
pub fn hourly_window(table: &ForecastTable) -> Vec<HourlyPoint> {
    let Some(start) = table.earliest() else {
        return Vec::new();
    };
    let end = start + Duration::hours(24);

    table
        .iter()
        .filter(|entry| entry.timestamp >= start && entry.timestamp < end)
        .enumerate()
        .map(|(index, entry)| HourlyPoint {
            label: if index == 0 {
                NOW_LABEL.to_string()
            } else {
                hour_label(entry.timestamp)
            },
            timestamp: entry.timestamp,
            temperature_c: entry.temperature_c,
            precipitation_mm: entry.precipitation_mm(),
            category: entry.category.clone(),
            icon: entry.icon.clone(),
        })
        .collect()
}

/// 12-hour clock with meridiem, e.g. "3 PM".
pub fn hour_label(timestamp: NaiveDateTime) -> String {
    timestamp.format("%-I %p").to_string()
}

pub fn weather_tally(table: &ForecastTable) -> WeatherTally {
    let mut counts = BTreeMap::new();
    for entry in table {
        *counts.entry(entry.category.clone()).or_insert(0) += 1;
    }
    WeatherTally { counts }
}

/// Pivot on (date, hour). A duplicate cell keeps the first value seen.
pub fn temperature_grid(table: &ForecastTable) -> TemperatureGrid {
    let mut cells = BTreeMap::new();
    let mut dates = BTreeSet::new();
    let mut hours = BTreeSet::new();

    for entry in table {
        let key = (entry.date(), entry.hour());
        cells.entry(key).or_insert(entry.temperature_c);
        dates.insert(key.0);
        hours.insert(key.1);
    }

    TemperatureGrid {
        dates: dates.into_iter().collect(),
        hours: hours.into_iter().collect(),
        cells,
    }
}
