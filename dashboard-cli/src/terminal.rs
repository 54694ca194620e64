//! Plain terminal rendering of a [`ViewModel`].

use colored::Colorize;
use comfy_table::{Table, presets::UTF8_FULL};
use dashboard_core::{ViewModel, model::title_case};

pub fn render(view: &ViewModel) -> String {
    let mut out = String::new();

    let place = match &view.location.country {
        Some(country) => format!("{} ({country})", view.city),
        None => view.city.clone(),
    };
    out.push_str(&format!(
        "\n{}\n",
        format!("🌤 Current Weather in {place}").bold()
    ));

    let now = &view.current;
    out.push_str(&format!(
        "🌡 {:.1} °C   💧 {}%   ☁ {}   🌬️ {:.1} m/s   {}\n",
        now.temperature_c,
        now.humidity_pct,
        title_case(&now.description),
        now.wind_speed_mps,
        if view.is_day { "☀ Day" } else { "🌙 Night" },
    ));

    let effects: Vec<&str> = view.theme.effects.iter().map(|e| e.as_str()).collect();
    out.push_str(&format!(
        "{}\n",
        format!(
            "Theme: sky {} / ground {}; effects: {}",
            view.theme.sky,
            view.theme.ground,
            if effects.is_empty() {
                "none".to_string()
            } else {
                effects.join(", ")
            }
        )
        .dimmed()
    ));

    if view.forecast.is_empty() {
        out.push_str("\nNo forecast data available.\n");
        return out;
    }

    section(&mut out, "🌤 5-Day Forecast", daily_table(view));
    section(&mut out, "🕒 Next 24 Hours", hourly_table(view));
    section(&mut out, "☁ Weather Type Distribution", tally_table(view));
    section(&mut out, "🌡 Hourly Temperature Heatmap", grid_table(view));

    out
}

fn section(out: &mut String, title: &str, table: Table) {
    out.push_str(&format!("\n{}\n{table}\n", title.bold()));
}

fn new_table(header: Vec<String>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header);
    table
}

fn daily_table(view: &ViewModel) -> Table {
    let mut table = new_table(vec![
        "Day".into(),
        "Temp (min / max)".into(),
        "Humidity".into(),
        "Condition".into(),
    ]);
    for day in &view.daily {
        table.add_row(vec![
            format!("{} {}", day.weekday(), day.date.format("%d %b")),
            format!("{:.1}°C / {:.1}°C", day.temp_min_c, day.temp_max_c),
            format!("{}%", day.humidity_pct),
            day.condition.clone(),
        ]);
    }
    table
}

fn hourly_table(view: &ViewModel) -> Table {
    let mut table = new_table(vec![
        "Time".into(),
        "Temp".into(),
        "Precipitation".into(),
        "Weather".into(),
    ]);
    for point in &view.hourly {
        table.add_row(vec![
            point.label.clone(),
            format!("{:.1}°C", point.temperature_c),
            format!("{:.1} mm", point.precipitation_mm),
            point.category.clone(),
        ]);
    }
    table
}

fn tally_table(view: &ViewModel) -> Table {
    let total = view.tally.total().max(1) as f64;
    let mut table = new_table(vec!["Weather".into(), "Count".into(), "Share".into()]);
    for (category, count) in view.tally.by_frequency() {
        table.add_row(vec![
            category.to_string(),
            count.to_string(),
            format!("{:.0}%", count as f64 * 100.0 / total),
        ]);
    }
    table
}

fn grid_table(view: &ViewModel) -> Table {
    let grid = &view.grid;
    let mut header = vec!["Day".to_string()];
    header.extend(grid.hours().iter().map(|h| format!("{h:02}h")));

    let mut table = new_table(header);
    for (date, row) in grid.dates().iter().zip(grid.matrix()) {
        let mut cells = vec![date.format("%a %d").to_string()];
        cells.extend(
            row.into_iter()
                .map(|cell| cell.map_or_else(|| "·".to_string(), |t| format!("{t:.0}"))),
        );
        table.add_row(cells);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_view;
    use dashboard_core::ForecastTable;

    #[test]
    fn renders_every_section() {
        let out = render(&sample_view(true));

        assert!(out.contains("Current Weather in Oslo (NO)"));
        assert!(out.contains("5-Day Forecast"));
        assert!(out.contains("Next 24 Hours"));
        assert!(out.contains("Weather Type Distribution"));
        assert!(out.contains("Hourly Temperature Heatmap"));
        assert!(out.contains("Light Snow"));
        assert!(out.contains("Now"));
    }

    #[test]
    fn heatmap_marks_missing_cells() {
        let out = render(&sample_view(true));
        // The fixture starts at 09:00, so the first day has no 00h cell.
        assert!(out.contains('·'));
        assert!(out.contains("00h"));
    }

    #[test]
    fn night_is_labelled_with_its_effects() {
        let out = render(&sample_view(false));
        assert!(out.contains("Night"));
        assert!(out.contains("effects: moon, stars, snow"));
    }

    #[test]
    fn empty_forecast_still_shows_current_conditions() {
        let mut view = sample_view(true);
        view.forecast = ForecastTable::default();

        let out = render(&view);
        assert!(out.contains("Current Weather"));
        assert!(out.contains("No forecast data available."));
        assert!(!out.contains("5-Day Forecast"));
    }
}
