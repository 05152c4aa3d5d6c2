use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select};
use tokio::net::TcpListener;
use weather_core::{Config, Units, WeatherService, WeatherSnapshot, api};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather lookup and HTTP proxy for OpenWeather")]
pub struct Cli {
    /// Use this config file instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and default units.
    Configure,

    /// Show current weather and a three-day forecast for a city.
    Show {
        /// City name, e.g. "London" or "Paris, FR".
        city: String,

        /// metric or imperial; defaults to the configured units.
        #[arg(long)]
        units: Option<Units>,
    },

    /// Serve the JSON API (`/geocode`, `/weather`).
    Serve {
        /// Listen address; overrides config and WEATHER_BIND.
        #[arg(long)]
        bind: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(self.config.as_deref()),
            Command::Show { city, units } => {
                let config = load_config(self.config.as_deref())?;
                let units = units.unwrap_or(config.units);
                show(&config, &city, units).await
            }
            Command::Serve { bind } => {
                let config = load_config(self.config.as_deref())?;
                let bind = bind.unwrap_or_else(|| config.bind.clone());
                serve(&config, &bind).await
            }
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    tracing::debug!(?path, configured = config.is_configured(), "configuration loaded");
    Ok(config.with_env_overrides())
}

fn configure(path: Option<&std::path::Path>) -> Result<()> {
    let mut config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Create one at https://home.openweathermap.org/api_keys")
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key);

    let current = Units::all()
        .iter()
        .position(|u| *u == config.units)
        .unwrap_or(0);
    config.units = Select::new("Default units:", Units::all().to_vec())
        .with_starting_cursor(current)
        .prompt()
        .context("Failed to read units")?;

    match path {
        Some(path) => config.save_to(path)?,
        None => config.save()?,
    }

    println!("Configuration saved.");
    Ok(())
}

async fn show(config: &Config, city: &str, units: Units) -> Result<()> {
    let service = WeatherService::from_config(config)?;

    let place = service.geocode(city).await?;
    let snapshot = service.get_weather(place.coordinate, units).await?;

    print!("{}", render(&place.name, &snapshot, units));
    Ok(())
}

async fn serve(config: &Config, bind: &str) -> Result<()> {
    let service = WeatherService::from_config(config)?;

    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;

    api::serve(listener, service).await
}

fn render(place: &str, snapshot: &WeatherSnapshot, units: Units) -> String {
    let symbol = units.temperature_symbol();
    let current = &snapshot.current;

    let mut out = format!(
        "{place} ({})\n  {:.1}{symbol}, {}\n  Wind {:.1} km/h, humidity {}%\n",
        current.observed_date,
        current.temperature,
        current.description,
        current.wind_speed_kmh,
        current.humidity_percent,
    );

    if snapshot.forecast.is_empty() {
        out.push_str("\nNo forecast available.\n");
        return out;
    }

    out.push_str("\nForecast:\n");
    for day in &snapshot.forecast {
        out.push_str(&format!(
            "  {:<7} {:>6.1}{symbol}  [{}]\n",
            day.calendar_date, day.temperature, day.icon_code
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use weather_core::{CurrentConditions, DailyForecastSummary, ForecastSample};

    fn snapshot(days: i64) -> WeatherSnapshot {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        WeatherSnapshot {
            current: CurrentConditions::new(
                21.04,
                "clear sky".into(),
                "01d".into(),
                3.0,
                45,
                today,
            ),
            forecast: (1..=days)
                .map(|i| {
                    DailyForecastSummary::new(
                        today + Duration::days(i),
                        &ForecastSample {
                            timestamp: 0,
                            temperature: 18.0 + i as f64,
                            icon_code: "02d".into(),
                        },
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn parses_show_with_units() {
        let cli = Cli::try_parse_from(["weather", "show", "Paris", "--units", "imperial"]).unwrap();
        match cli.command {
            Command::Show { city, units } => {
                assert_eq!(city, "Paris");
                assert_eq!(units, Some(Units::Imperial));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_units() {
        assert!(Cli::try_parse_from(["weather", "show", "Paris", "--units", "kelvin"]).is_err());
    }

    #[test]
    fn parses_serve_with_global_config() {
        let cli = Cli::try_parse_from([
            "weather", "serve", "--bind", "0.0.0.0:9000", "--config", "w.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("w.toml")));
        assert!(matches!(
            cli.command,
            Command::Serve { bind: Some(ref b) } if b == "0.0.0.0:9000"
        ));
    }

    #[test]
    fn render_lists_current_and_forecast() {
        let out = render("Paris", &snapshot(3), Units::Metric);

        assert!(out.starts_with("Paris (19 Oct 2026)"));
        assert!(out.contains("21.0°C, clear sky"));
        assert!(out.contains("Wind 10.8 km/h, humidity 45%"));
        assert!(out.contains("20 Oct"));
        assert!(out.contains("22 Oct"));
        assert_eq!(out.matches("[02d]").count(), 3);
    }

    #[test]
    fn render_without_forecast() {
        let out = render("Paris", &snapshot(0), Units::Imperial);
        assert!(out.contains("No forecast available."));
        assert!(out.contains("°F"));
    }
}
