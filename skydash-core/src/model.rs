use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the caller wants fetched, independent of which provider will serve it.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestIntent {
    ByCity(String),
    ByCoords { lat: f64, lon: f64 },
    ForecastByCity(String),
    WeeklyByCoords { lat: f64, lon: f64 },
}

impl RequestIntent {
    pub fn city(&self) -> Option<&str> {
        match self {
            RequestIntent::ByCity(city) | RequestIntent::ForecastByCity(city) => Some(city),
            _ => None,
        }
    }

    pub fn coords(&self) -> Option<(f64, f64)> {
        match self {
            RequestIntent::ByCoords { lat, lon } | RequestIntent::WeeklyByCoords { lat, lon } => {
                Some((*lat, *lon))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

/// Current conditions, normalized across providers.
///
/// Name/country/description/icon are empty strings when a provider has
/// nothing to offer; humidity, wind and coordinates stay `None` instead of
/// being coerced to zero, since callers branch on presence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReport {
    pub provider: String,
    pub name: String,
    pub country: String,
    pub description: String,
    pub icon: String,
    pub temperature_c: f64,
    pub humidity_pct: Option<f64>,
    pub wind_speed_mps: Option<f64>,
    pub coord: Option<Coord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub time: DateTime<Utc>,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    pub description: String,
    pub icon: String,
}

/// Time-ordered forecast entries as returned by one provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast {
    pub provider: String,
    pub entries: Vec<ForecastEntry>,
}

/// Either kind of successful fetch; this is what the last-result slot holds.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Current(WeatherReport),
    Forecast(Forecast),
}
