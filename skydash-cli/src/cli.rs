use anyhow::Context;
use chrono::Timelike;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use skydash_core::{
    FetchOutcome, Forecast, ForecastEntry, KeySources, RequestIntent, StoredConfig, WeatherClient,
    WeatherError, WeatherReport,
};

use crate::genconfig;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skydash", version, about = "Weather dashboard CLI")]
pub struct Cli {
    /// API key or URL template; takes precedence over every other source.
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Ignore any configured key and use the public no-key providers.
    #[arg(long, global = true)]
    pub public: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current conditions for a city or a coordinate pair.
    Current {
        /// City name; omit when passing --lat/--lon.
        city: Option<String>,

        #[arg(long, requires = "lon")]
        lat: Option<f64>,

        #[arg(long, requires = "lat")]
        lon: Option<f64>,
    },

    /// Show the 5-day forecast for a city.
    Forecast {
        /// City name.
        city: String,
    },

    /// Show the weekly forecast for a coordinate pair (needs an API key).
    Weekly {
        #[arg(long)]
        lat: f64,

        #[arg(long)]
        lon: f64,
    },

    /// Store an API key for later runs.
    Configure,

    /// Write config.local.js from OPENWEATHER_API_KEY or a .env file.
    GenerateConfig {
        /// Destination file; defaults to ./config.local.js.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        let Cli { api_key, public, command } = self;

        match command {
            Command::Current { city, lat, lon } => {
                let intent = current_intent(city, lat, lon)?;
                match fetch(api_key, public, &intent).await? {
                    FetchOutcome::Current(report) => print_report(&report),
                    FetchOutcome::Forecast(forecast) => print_forecast(&forecast, 5),
                }
            }
            Command::Forecast { city } => {
                let intent = RequestIntent::ForecastByCity(city);
                match fetch(api_key, public, &intent).await? {
                    FetchOutcome::Forecast(forecast) => print_forecast(&forecast, 5),
                    FetchOutcome::Current(report) => print_report(&report),
                }
            }
            Command::Weekly { lat, lon } => {
                let key = key_sources(api_key, public)?.resolve();
                let mut client = WeatherClient::new(key);
                let intent = RequestIntent::WeeklyByCoords { lat, lon };
                match client.fetch(&intent).await {
                    Ok(FetchOutcome::Forecast(forecast)) => print_forecast(&forecast, 7),
                    Ok(FetchOutcome::Current(report)) => print_report(&report),
                    Err(WeatherError::NoCredential) => anyhow::bail!(
                        "The weekly forecast needs a real OpenWeatherMap API key.\n\
                         Hint: run `skydash configure` and enter your key."
                    ),
                    Err(err) => return Err(err.into()),
                }
            }
            Command::Configure => configure()?,
            Command::GenerateConfig { out } => return Ok(genconfig::run(out.as_deref())),
        }

        Ok(ExitCode::SUCCESS)
    }
}

fn current_intent(
    city: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
) -> anyhow::Result<RequestIntent> {
    if let Some(city) = city {
        return Ok(RequestIntent::ByCity(city));
    }
    if let (Some(lat), Some(lon)) = (lat, lon) {
        return Ok(RequestIntent::ByCoords { lat, lon });
    }

    let city = inquire::Text::new("City name:").prompt().context("No city or coordinates given")?;
    Ok(RequestIntent::ByCity(city))
}

/// The key sources the page would have injected, in the same precedence:
/// the command line, a generated config.local.js, then the saved config.
fn key_sources(api_key: Option<String>, public: bool) -> anyhow::Result<KeySources> {
    let stored = StoredConfig::load()?;

    Ok(KeySources {
        injected: api_key,
        embedded: genconfig::read_config_js(Path::new(genconfig::CONFIG_FILENAME)),
        fallback: stored.api_key,
        force_public: public,
    })
}

async fn fetch(
    api_key: Option<String>,
    public: bool,
    intent: &RequestIntent,
) -> anyhow::Result<FetchOutcome> {
    let key = key_sources(api_key, public)?.resolve();
    let mut client = WeatherClient::new(key);
    client.fetch(intent).await.map_err(Into::into)
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = StoredConfig::load()?;

    let key = inquire::Text::new("OpenWeatherMap API key (or URL template):")
        .prompt()
        .context("Configuration cancelled")?;
    cfg.api_key = Some(key);
    cfg.save()?;

    println!("Saved to {}", StoredConfig::config_file_path()?.display());
    Ok(())
}

fn print_report(report: &WeatherReport) {
    let place = match (report.name.is_empty(), report.country.is_empty()) {
        (false, false) => format!("{}, {}", report.name, report.country),
        (false, true) => report.name.clone(),
        _ => report
            .coord
            .map(|c| format!("{:.2}, {:.2}", c.lat, c.lon))
            .unwrap_or_else(|| "Unknown location".to_string()),
    };

    println!("{place}: {}", report.description);
    println!("Temperature: {:.0}°C", report.temperature_c);
    if let Some(humidity) = report.humidity_pct {
        println!("Humidity: {humidity:.0}%");
    }
    if let Some(wind) = report.wind_speed_mps {
        println!("Wind: {wind:.1} m/s");
    }
    println!("Source: {}", report.provider);
}

/// Collapse entries into one line per calendar day, up to `max_days`.
/// 3-hourly forecasts shrink to a daily range; daily collections pass
/// through unchanged.
fn print_forecast(forecast: &Forecast, max_days: usize) {
    let mut days: Vec<(chrono::NaiveDate, Vec<&ForecastEntry>)> = Vec::new();
    for entry in &forecast.entries {
        let date = entry.time.date_naive();
        match days.last_mut() {
            Some((day, bucket)) if *day == date => bucket.push(entry),
            _ => days.push((date, vec![entry])),
        }
    }

    for (date, bucket) in days.iter().take(max_days) {
        let min = bucket.iter().map(|e| e.temp_min_c).fold(f64::INFINITY, f64::min);
        let max = bucket.iter().map(|e| e.temp_max_c).fold(f64::NEG_INFINITY, f64::max);
        let rep = bucket
            .iter()
            .find(|e| e.time.hour() == 12)
            .copied()
            .unwrap_or(bucket[bucket.len() / 2]);

        println!("{}  {:>3.0}° / {:<3.0}°  {}", date.format("%a %d %b"), max, min, rep.description);
    }
    println!("Source: {}", forecast.provider);
}
