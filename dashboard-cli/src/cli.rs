use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use dashboard_core::{
    Config, Dashboard, QueryError, Settings, ViewModel,
    config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS},
};
use inquire::{CustomType, InquireError, Text};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{error, info};

use crate::{html, terminal};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dashboard", version, about = "Weather dashboard for any city")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write the optional settings file (API endpoint, request timeout).
    Configure,

    /// Show the dashboard for one city.
    Show {
        /// City name, e.g. "Rio de Janeiro".
        #[arg(required = true, num_args = 1..)]
        city: Vec<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Also write a standalone HTML dashboard to this path.
        #[arg(long)]
        html: Option<PathBuf>,
    },

    /// Prompt for city names until cancelled with Esc or Ctrl-C.
    Watch {
        /// Rewrite this HTML dashboard after every successful query.
        #[arg(long)]
        html: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, format, html } => {
                let dashboard = load_dashboard()?;
                show(&dashboard, &city.join(" "), format, html.as_deref()).await
            }
            Command::Watch { html } => {
                let dashboard = load_dashboard()?;
                watch(&dashboard, html.as_deref()).await
            }
        }
    }
}

/// Missing credentials fail here, before any query runs.
fn load_dashboard() -> Result<Dashboard> {
    let config = Config::from_env()?;
    info!(?config, "Configuration loaded");
    Ok(Dashboard::from_config(&config)?)
}

async fn show(
    dashboard: &Dashboard,
    city: &str,
    format: OutputFormat,
    html_path: Option<&Path>,
) -> Result<()> {
    match dashboard.on_city_submitted(city).await {
        Ok(Some(view)) => {
            emit(&view, format)?;
            if let Some(path) = html_path {
                write_html(&view, path)?;
            }
            Ok(())
        }
        Ok(None) => {
            println!("Enter a city name to see its weather.");
            Ok(())
        }
        Err(err) => {
            error!(error = %err, "Query failed");
            let message = err.user_message();
            Err(anyhow::Error::new(err).context(message))
        }
    }
}

async fn watch(dashboard: &Dashboard, html_path: Option<&Path>) -> Result<()> {
    println!("{}", "🌦️ Weather Dashboard".bold());
    println!("Always Be Satisfied With Nature! 😊\n");

    loop {
        let input = Text::new("City:")
            .with_help_message("Blank stays idle, Esc quits")
            .prompt();

        let city = match input {
            Ok(city) => city,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(anyhow::Error::new(e).context("Failed to read city name")),
        };

        match dashboard.on_city_submitted(&city).await {
            Ok(Some(view)) => {
                print!("{}", terminal::render(&view));
                if let Some(path) = html_path {
                    if let Err(e) = write_html(&view, path) {
                        eprintln!("{} {e:#}", "Could not write HTML:".red());
                    }
                }
            }
            Ok(None) => {}
            Err(err) => report(&err),
        }
    }

    Ok(())
}

fn report(err: &QueryError) {
    if err.is_silent() {
        return;
    }
    error!(error = %err, "Query failed");
    eprintln!("{}", err.user_message().red());
}

fn emit(view: &ViewModel, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", terminal::render(view)),
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(view).context("Failed to serialize dashboard")?;
            println!("{json}");
        }
    }
    Ok(())
}

fn write_html(view: &ViewModel, path: &Path) -> Result<()> {
    fs::write(path, html::render(view))
        .with_context(|| format!("Failed to write HTML dashboard: {}", path.display()))?;
    info!(path = %path.display(), "HTML dashboard written");
    Ok(())
}

fn configure() -> Result<()> {
    let current = Settings::load()?;

    let base_url = Text::new("API base URL:")
        .with_default(current.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))
        .prompt()
        .context("Failed to read base URL")?;

    let timeout_secs = CustomType::<u64>::new("Request timeout (seconds):")
        .with_default(current.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
        .with_error_message("Please enter a whole number of seconds")
        .prompt()
        .context("Failed to read timeout")?;

    let settings = Settings {
        base_url: Some(base_url.trim().to_string()).filter(|s| !s.is_empty()),
        timeout_secs: Some(timeout_secs.max(1)),
    };
    let path = settings.save()?;

    println!("Settings saved to {}", path.display());
    println!("The API key is read from the API_KEY environment variable (or a .env file).");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_joins_multi_word_city() {
        let cli = Cli::try_parse_from(["weather-dashboard", "show", "Rio", "de", "Janeiro"])
            .expect("args parse");

        match cli.command {
            Command::Show { city, format, html } => {
                assert_eq!(city.join(" "), "Rio de Janeiro");
                assert_eq!(format, OutputFormat::Text);
                assert_eq!(html, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn show_accepts_json_and_html() {
        let cli = Cli::try_parse_from([
            "weather-dashboard",
            "show",
            "Oslo",
            "--format",
            "json",
            "--html",
            "out.html",
        ])
        .expect("args parse");

        match cli.command {
            Command::Show { format, html, .. } => {
                assert_eq!(format, OutputFormat::Json);
                assert_eq!(html, Some(PathBuf::from("out.html")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn show_requires_a_city() {
        assert!(Cli::try_parse_from(["weather-dashboard", "show"]).is_err());
    }

    #[test]
    fn watch_and_configure_parse() {
        assert!(matches!(
            Cli::try_parse_from(["weather-dashboard", "watch"]).map(|c| c.command),
            Ok(Command::Watch { html: None })
        ));
        assert!(matches!(
            Cli::try_parse_from(["weather-dashboard", "configure"]).map(|c| c.command),
            Ok(Command::Configure)
        ));
    }
}
