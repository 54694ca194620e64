//! Standalone HTML dashboard: themed background, forecast cards, Plotly charts.

use dashboard_core::{AmbientEffect, Theme, ViewModel, model::title_case};
use serde_json::{Value, json};

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";
const ICON_BASE: &str = "https://openweathermap.org/img/wn";
const CARD_COLOR: &str = "#ADD8E6";

const STYLE: &str = r#"
html, body { margin: 0; padding: 0; min-height: 100%; font-family: sans-serif;
  background: linear-gradient(%SKY%, %GROUND%); background-attachment: fixed; color: %TEXT%; }
main { position: relative; z-index: 10; padding: 2em 3em; }
h1, h2, h3, p { color: %TEXT%; text-shadow: 0 0 3px rgba(0,0,0,0.3); }
.metrics { display: flex; gap: 3em; }
.metric .label { font-size: 0.9em; opacity: 0.8; }
.metric .value { font-size: 2em; }
.cards { display: grid; grid-template-columns: repeat(5, 1fr); gap: 1em; }
.card { background-color: %CARD%; border-radius: 15px; padding: 10px; text-align: center;
  box-shadow: 2px 2px 10px rgba(0,0,0,0.3); color: #000000; }
.card h4, .card p { margin: 5px; color: #000000; text-shadow: none; }
.charts { display: grid; grid-template-columns: 1fr 1fr; gap: 1em; }
.chart { background: rgba(255,255,255,0.85); border-radius: 10px; min-height: 380px; }
.chart.wide { grid-column: span 2; }
.rain { position: fixed; width: 2px; height: 15px; background: %ACCENT%;
  animation: rain 0.7s linear infinite; left: calc(100% * var(--i)); top: -20px; z-index: 5; }
@keyframes rain { to { transform: translateY(110vh); } }
.snow { position: fixed; width: 6px; height: 6px; background: %ACCENT%; border-radius: 50%;
  animation: snow 7s linear infinite; left: calc(100% * var(--i)); top: -10px; z-index: 5; }
@keyframes snow { to { transform: translateY(110vh) translateX(40px); } }
.cloud { background: %ACCENT%; border-radius: 100px; position: fixed; width: 220px; height: 60px;
  opacity: 0.6; animation: moveclouds linear infinite; z-index: 4; }
.cloud:nth-child(3n+1) { top: 15%; animation-duration: 60s; }
.cloud:nth-child(3n+2) { top: 30%; animation-duration: 90s; }
.cloud:nth-child(3n) { top: 45%; animation-duration: 120s; }
@keyframes moveclouds { from { left: -250px; } to { left: 100%; } }
.star { position: fixed; width: 2px; height: 2px; background: white; border-radius: 50%;
  opacity: 0.8; animation: starfall linear infinite; animation-duration: 40s;
  left: calc(100% * var(--i)); top: -5px; z-index: 3; }
@keyframes starfall { to { transform: translateY(100vh); } }
.moon { position: fixed; top: 10%; right: 10%; width: 80px; height: 80px; background: #fdfcdc;
  border-radius: 50%; box-shadow: 0 0 30px #fff; z-index: 3; }
.sun { position: fixed; top: 8%; right: 12%; width: 90px; height: 90px; background: #ffd93b;
  border-radius: 50%; box-shadow: 0 0 60px #ffe98a; z-index: 3; }
"#;

pub fn render(view: &ViewModel) -> String {
    let mut body = String::new();

    body.push_str("<h1>🌦️ Weather Dashboard</h1>\n");
    body.push_str("<h3>Always Be Satisfied With Nature! 😊</h3>\n");
    body.push_str(&format!(
        "<h2>🌤 Current Weather in {}</h2>\n",
        escape(&view.city)
    ));
    body.push_str(&metrics(view));

    if !view.daily.is_empty() {
        body.push_str("<h2>🌤 5-Day Forecast</h2>\n");
        body.push_str(&cards(view));
    }

    if !view.forecast.is_empty() {
        body.push_str(&chart_containers());
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n\
         <title>Weather: {title}</title>\n<style>{style}</style>\n\
         <script src=\"{PLOTLY_CDN}\"></script>\n</head>\n<body>\n\
         <div class=\"effects\">{effects}</div>\n<main>\n{body}</main>\n\
         <script>\n{script}</script>\n</body>\n</html>\n",
        title = escape(&view.city),
        style = style(&view.theme),
        effects = effects(&view.theme),
        script = script(view),
    )
}

fn style(theme: &Theme) -> String {
    STYLE
        .replace("%SKY%", theme.sky)
        .replace("%GROUND%", theme.ground)
        .replace("%TEXT%", theme.text)
        .replace("%ACCENT%", theme.accent)
        .replace("%CARD%", CARD_COLOR)
}

fn effects(theme: &Theme) -> String {
    let mut out = String::new();
    for effect in &theme.effects {
        let class = match effect {
            AmbientEffect::Clouds => "cloud",
            AmbientEffect::Sun => "sun",
            AmbientEffect::Moon => "moon",
            AmbientEffect::Stars => "star",
            AmbientEffect::Rain => "rain",
            AmbientEffect::Snow => "snow",
        };
        out.push_str(&format!("<div class=\"{class}\"></div>").repeat(effect.particle_count()));
    }
    out
}

fn metrics(view: &ViewModel) -> String {
    let now = &view.current;
    let metric = |label: &str, value: String| {
        format!(
            "<div class=\"metric\"><div class=\"label\">{label}</div>\
             <div class=\"value\">{}</div></div>",
            escape(&value)
        )
    };

    format!(
        "<div class=\"metrics\">{}{}{}</div>\n",
        metric("🌡 Temperature", format!("{} °C", now.temperature_c)),
        metric("💧 Humidity", format!("{}%", now.humidity_pct)),
        metric("☁ Condition", title_case(&now.description)),
    )
}

fn cards(view: &ViewModel) -> String {
    let mut out = String::from("<div class=\"cards\">\n");
    for day in &view.daily {
        let icon = day
            .icon
            .as_deref()
            .map(|icon| {
                format!(
                    "<img src=\"{ICON_BASE}/{}@2x.png\" width=\"80\"/>",
                    escape(icon)
                )
            })
            .unwrap_or_default();

        out.push_str(&format!(
            "<div class=\"card\"><h4>{}</h4>{icon}\
             <p>🌡 {}°C / {}°C</p><p>💧 {}%</p><p>☁ {}</p></div>\n",
            day.weekday(),
            day.temp_min_c,
            day.temp_max_c,
            day.humidity_pct,
            escape(&day.condition),
        ));
    }
    out.push_str("</div>\n");
    out
}

const CHARTS: &[(&str, bool)] = &[
    ("temperature", false),
    ("humidity", false),
    ("precipitation", false),
    ("wind", false),
    ("distribution", false),
    ("heatmap", false),
    ("range", true),
];

fn chart_containers() -> String {
    let mut out = String::from("<div class=\"charts\">\n");
    for (id, wide) in CHARTS {
        let class = if *wide { "chart wide" } else { "chart" };
        out.push_str(&format!("<div id=\"{id}\" class=\"{class}\"></div>\n"));
    }
    out.push_str("</div>\n");
    out
}

/// Plotly figure specs keyed by container id.
fn chart_specs(view: &ViewModel) -> Value {
    let rows = view.forecast.rows();
    let x: Vec<String> = rows
        .iter()
        .map(|r| r.timestamp.format("%Y-%m-%d %H:%M").to_string())
        .collect();
    let column = |f: fn(&dashboard_core::ForecastEntry) -> f64| -> Vec<f64> {
        rows.iter().map(f).collect()
    };

    let (labels, values): (Vec<&str>, Vec<usize>) = view.tally.by_frequency().into_iter().unzip();
    let hours: Vec<String> = view.grid.hours().iter().map(|h| h.to_string()).collect();
    let days: Vec<String> = view.grid.dates().iter().map(|d| d.to_string()).collect();

    json!({
        "temperature": {
            "data": [{"x": x, "y": column(|r| r.temperature_c), "mode": "lines+markers",
                      "line": {"color": "#ee7c18"}, "name": "Temp (°C)"}],
            "layout": {"title": "📈 Temperature Forecast",
                       "xaxis": {"title": "Date"}, "yaxis": {"title": "Temp (°C)"}}
        },
        "humidity": {
            "data": [{"x": x, "y": rows.iter().map(|r| r.humidity_pct).collect::<Vec<_>>(),
                      "mode": "lines+markers", "name": "Humidity (%)"}],
            "layout": {"title": "💧 Humidity Forecast (%)",
                       "xaxis": {"title": "Date"}, "yaxis": {"title": "Humidity (%)"}}
        },
        "precipitation": {
            "data": [{"x": x, "y": column(|r| r.precipitation_mm()), "type": "bar",
                      "marker": {"color": "#3498db"}, "name": "Precipitation (mm)"}],
            "layout": {"title": "💧 Precipitation Forecast (mm)",
                       "xaxis": {"title": "Date"}, "yaxis": {"title": "Precipitation (mm)"}}
        },
        "wind": {
            "data": [{"x": x, "y": column(|r| r.wind_speed_mps), "mode": "lines",
                      "line": {"color": "#2ecc71"}, "name": "Wind Speed (m/s)"}],
            "layout": {"title": "🌬️ Wind Speed (m/s)",
                       "xaxis": {"title": "Date"}, "yaxis": {"title": "Wind Speed (m/s)"}}
        },
        "distribution": {
            "data": [{"labels": labels, "values": values, "type": "pie"}],
            "layout": {"title": "☁ Weather Type Distribution"}
        },
        "heatmap": {
            "data": [{"z": view.grid.matrix(), "x": hours, "y": days, "type": "heatmap",
                      "colorbar": {"title": "Temp °C"}}],
            "layout": {"title": "🌡 Hourly Temperature Heatmap",
                       "xaxis": {"title": "Hour", "type": "category"},
                       "yaxis": {"title": "Day", "type": "category"}}
        },
        "range": {
            "data": [
                {"x": x, "y": column(|r| r.temp_max_c), "mode": "lines",
                 "line": {"color": "#e74c3c"}, "name": "Max"},
                {"x": x, "y": column(|r| r.temp_min_c), "mode": "none", "fill": "tonexty",
                 "fillcolor": "rgba(231, 76, 60, 0.2)", "name": "Min"}
            ],
            "layout": {"title": "🌡 Temperature Range"}
        }
    })
}

fn script(view: &ViewModel) -> String {
    let mut out = String::from(
        "document.querySelectorAll('.rain, .snow, .star').forEach(el => {\n  \
         el.style.setProperty('--i', Math.random());\n});\n",
    );

    if !view.forecast.is_empty() {
        // "</" inside a <script> block would end it early.
        let specs = chart_specs(view).to_string().replace("</", "<\\/");
        out.push_str(&format!("const charts = {specs};\n"));
        out.push_str(
            "for (const [id, fig] of Object.entries(charts)) {\n  \
             Plotly.newPlot(id, fig.data, fig.layout, {responsive: true});\n}\n",
        );
    }
    out
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
